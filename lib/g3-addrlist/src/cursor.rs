/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::trace;

use super::{AddrListError, ArcAddressList, Endpoint};

/// Per-operation iteration state over one address list snapshot.
///
/// The first endpoint tried is the one that answered last time. Each call to
/// [`AddressCursor::iterate`] moves to the next endpoint, wrapping around,
/// until every endpoint has been tried once.
#[derive(Debug)]
pub struct AddressCursor {
    alist: Option<ArcAddressList>,
    start: usize,
    index: usize,
    begun: bool,
    exhausted: bool,
    responded: bool,
    error: Option<AddrListError>,
}

impl AddressCursor {
    pub fn new(alist: ArcAddressList) -> Result<Self, AddrListError> {
        if alist.is_empty() {
            return Err(AddrListError::NoDestination);
        }

        let mut start = alist.preferred_index();
        if start >= alist.len() {
            start = 0;
        }

        Ok(AddressCursor {
            alist: Some(alist),
            start,
            index: start,
            begun: false,
            exhausted: false,
            responded: false,
            error: None,
        })
    }

    /// Select the next endpoint to try.
    ///
    /// Returns false once the whole ring has been walked, in which case the
    /// cursor error is set to [`AddrListError::NoDestination`]. An exhausted
    /// cursor stays exhausted.
    pub fn iterate(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let Some(alist) = &self.alist else {
            return false;
        };

        if self.begun {
            self.index += 1;
            if self.index == alist.len() {
                self.index = 0;
            }

            if self.index == self.start {
                trace!("all {} addresses tried", alist.len());
                self.exhausted = true;
                self.responded = false;
                self.error = Some(AddrListError::NoDestination);
                return false;
            }
        }

        self.begun = true;
        self.responded = false;
        true
    }

    /// The endpoint currently selected.
    pub fn addr(&self) -> Option<&Endpoint> {
        if !self.begun || self.exhausted {
            return None;
        }
        self.alist.as_ref().and_then(|alist| alist.get(self.index))
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn alist(&self) -> Option<&ArcAddressList> {
        self.alist.as_ref()
    }

    #[inline]
    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Note that the current endpoint sent back a reply of any kind.
    pub fn mark_responded(&mut self) {
        if self.begun && !self.exhausted {
            self.responded = true;
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn error(&self) -> Option<&AddrListError> {
        self.error.as_ref()
    }

    /// Release the address list, and remember the current endpoint in it if
    /// it answered and it is not the one we started with.
    pub fn release(&mut self) -> Result<(), AddrListError> {
        if let Some(alist) = self.alist.take() {
            if self.responded && self.index != self.start {
                alist.set_preferred_index(self.index);
            }
            trace!(
                "release cursor at {}/{}, list refcount {}",
                self.index,
                alist.len(),
                Arc::strong_count(&alist)
            );
        }

        self.begun = false;
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Drop for AddressCursor {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
