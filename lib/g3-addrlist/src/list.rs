/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::slice;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AddrListError, Endpoint};

/// Hard ceiling of endpoints kept in one list.
pub const MAX_ADDRESSES: usize = 64;

pub type ArcAddressList = Arc<AddressList>;

/// Sorted and deduplicated endpoints of one logical server.
///
/// IPv4 endpoints always come first. A list is filled through the merge
/// functions while it is still owned exclusively, and becomes read-only once
/// it is shared via [`AddressList::into_shared`]. The only field that changes
/// after that is the advisory preferred index.
#[derive(Debug)]
pub struct AddressList {
    pub(crate) max_addrs: usize,
    pub(crate) nr_ipv4: usize,
    pub(crate) addrs: Vec<Endpoint>,
    service_id: u16,
    port: u16,
    index: AtomicUsize,
}

impl AddressList {
    /// Allocate an empty list with room for `nr` endpoints.
    ///
    /// `nr` is clamped to [`MAX_ADDRESSES`]. Every endpoint merged later will
    /// carry `service_id`, and `port` is the one used by callers that have no
    /// explicit port for an address.
    pub fn allocate(nr: usize, service_id: u16, port: u16) -> Result<Self, AddrListError> {
        let max_addrs = nr.min(MAX_ADDRESSES);

        let mut addrs = Vec::new();
        addrs
            .try_reserve_exact(max_addrs)
            .map_err(|_| AddrListError::AllocationFailure)?;

        Ok(AddressList {
            max_addrs,
            nr_ipv4: 0,
            addrs,
            service_id,
            port,
            index: AtomicUsize::new(0),
        })
    }

    pub fn into_shared(self) -> ArcAddressList {
        Arc::new(self)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.addrs.len() >= self.max_addrs
    }

    #[inline]
    pub fn max_addrs(&self) -> usize {
        self.max_addrs
    }

    #[inline]
    pub fn nr_ipv4(&self) -> usize {
        self.nr_ipv4
    }

    #[inline]
    pub fn nr_ipv6(&self) -> usize {
        self.addrs.len() - self.nr_ipv4
    }

    #[inline]
    pub fn service_id(&self) -> u16 {
        self.service_id
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn get(&self, i: usize) -> Option<&Endpoint> {
        self.addrs.get(i)
    }

    pub fn iter(&self) -> slice::Iter<'_, Endpoint> {
        self.addrs.iter()
    }

    pub fn as_slice(&self) -> &[Endpoint] {
        &self.addrs
    }

    pub fn ipv4_addrs(&self) -> &[Endpoint] {
        &self.addrs[..self.nr_ipv4]
    }

    pub fn ipv6_addrs(&self) -> &[Endpoint] {
        &self.addrs[self.nr_ipv4..]
    }

    /// The index of the endpoint that answered last, a hint for new cursors.
    pub fn preferred_index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub(crate) fn set_preferred_index(&self, index: usize) {
        self.index.store(index, Ordering::Relaxed);
    }

    /// Check if both lists contain the same endpoints in the same order.
    pub fn same_addrs(&self, other: &AddressList) -> bool {
        self.nr_ipv4 == other.nr_ipv4 && self.addrs == other.addrs
    }
}

impl<'a> IntoIterator for &'a AddressList {
    type Item = &'a Endpoint;
    type IntoIter = slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
