/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct ServerGroupStats {
    lookup_total: AtomicU64,
    lookup_failed: AtomicU64,
    lookup_malformed: AtomicU64,
    lookup_unchanged: AtomicU64,
    cursor_total: AtomicU64,
    cursor_no_dest: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServerGroupStatsSnapshot {
    pub lookup_total: u64,
    pub lookup_failed: u64,
    pub lookup_malformed: u64,
    pub lookup_unchanged: u64,
    pub cursor_total: u64,
    pub cursor_no_dest: u64,
}

impl ServerGroupStats {
    pub fn snapshot(&self) -> ServerGroupStatsSnapshot {
        ServerGroupStatsSnapshot {
            lookup_total: self.lookup_total.load(Ordering::Relaxed),
            lookup_failed: self.lookup_failed.load(Ordering::Relaxed),
            lookup_malformed: self.lookup_malformed.load(Ordering::Relaxed),
            lookup_unchanged: self.lookup_unchanged.load(Ordering::Relaxed),
            cursor_total: self.cursor_total.load(Ordering::Relaxed),
            cursor_no_dest: self.cursor_no_dest.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add_lookup_total(&self) {
        self.lookup_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_lookup_failed(&self) {
        self.lookup_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_lookup_malformed(&self) {
        self.lookup_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_lookup_unchanged(&self) {
        self.lookup_unchanged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_cursor_total(&self) {
        self.cursor_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_cursor_no_dest(&self) {
        self.cursor_no_dest.fetch_add(1, Ordering::Relaxed);
    }
}
