/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use arc_swap::ArcSwapOption;
use log::{debug, warn};

use super::{
    AddrListError, AddressCursor, AddressList, ArcAddressList, RecordResolver,
    ServerGroupConfig, ServerGroupStats, resolve_and_build,
};

#[derive(Default)]
struct LookupState {
    done: bool,
    dns_expiry: Option<Instant>,
    error: Option<AddrListError>,
}

/// A logical server, owner of its current address list.
///
/// The address list is replaced as a whole on every successful lookup.
/// Cursors keep the list they were created on, no matter how many times it
/// is replaced afterwards.
pub struct ServerGroup {
    config: ServerGroupConfig,
    vl_addrs: ArcSwapOption<AddressList>,
    update_lock: Mutex<()>,
    lookup: Mutex<LookupState>,
    lookup_cond: Condvar,
    stats: Arc<ServerGroupStats>,
}

impl ServerGroup {
    pub fn new(config: ServerGroupConfig) -> Self {
        ServerGroup {
            config,
            vl_addrs: ArcSwapOption::empty(),
            update_lock: Mutex::new(()),
            lookup: Mutex::new(LookupState::default()),
            lookup_cond: Condvar::new(),
            stats: Arc::new(ServerGroupStats::default()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    #[inline]
    pub fn config(&self) -> &ServerGroupConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<ServerGroupStats> {
        Arc::clone(&self.stats)
    }

    /// Get a snapshot of the current address list.
    pub fn load_vl_addrs(&self) -> Option<ArcAddressList> {
        self.vl_addrs.load_full()
    }

    /// Publish a new address list, valid until `expiry`.
    ///
    /// Serialized with [`ServerGroup::update_vl_addrs`].
    pub fn install_vl_addrs(&self, alist: ArcAddressList, expiry: Instant) {
        let _guard = self.update_lock.lock().unwrap();
        self.store_vl_addrs(alist, expiry);
    }

    // the caller should hold the update lock
    fn store_vl_addrs(&self, alist: ArcAddressList, expiry: Instant) {
        self.vl_addrs.store(Some(alist));
        self.finish_lookup(expiry, None);
    }

    fn finish_lookup(&self, expiry: Instant, error: Option<AddrListError>) {
        let mut state = self.lookup.lock().unwrap();
        state.done = true;
        state.dns_expiry = Some(expiry);
        state.error = error;
        self.lookup_cond.notify_all();
    }

    pub fn dns_expiry(&self) -> Option<Instant> {
        self.lookup.lock().unwrap().dns_expiry
    }

    /// The error of the last lookup, cleared by a successful one.
    pub fn last_error(&self) -> Option<AddrListError> {
        self.lookup.lock().unwrap().error.clone()
    }

    pub fn need_lookup(&self, now: Instant) -> bool {
        let state = self.lookup.lock().unwrap();
        if !state.done {
            return true;
        }
        match state.dns_expiry {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    /// Look up the address record again and publish the result.
    ///
    /// On failure the current list is kept and the error is cached until the
    /// negative ttl expires.
    pub fn update_vl_addrs(&self, resolver: &dyn RecordResolver) -> Result<(), AddrListError> {
        let _guard = self.update_lock.lock().unwrap();
        self.stats.add_lookup_total();

        match resolve_and_build(
            resolver,
            self.config.name(),
            self.config.service_id(),
            self.config.port(),
        ) {
            Ok((alist, expiry)) => {
                let unchanged = self
                    .vl_addrs
                    .load_full()
                    .map(|cur| cur.same_addrs(&alist))
                    .unwrap_or(false);
                if unchanged {
                    debug!(
                        "address list of server group {} is unchanged",
                        self.config.name()
                    );
                    self.stats.add_lookup_unchanged();
                    self.finish_lookup(expiry, None);
                } else {
                    debug!(
                        "install {} addresses for server group {}",
                        alist.len(),
                        self.config.name()
                    );
                    self.store_vl_addrs(alist.into_shared(), expiry);
                }
                Ok(())
            }
            Err(e) => {
                self.stats.add_lookup_failed();
                if e.is_format_error() {
                    self.stats.add_lookup_malformed();
                }
                warn!(
                    "address lookup for server group {} failed: {e}",
                    self.config.name()
                );
                let expiry = Instant::now() + self.config.negative_ttl();
                self.finish_lookup(expiry, Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Get a cursor for iterating over the volume location servers.
    ///
    /// If no address list has been published yet, this waits for the first
    /// lookup to finish, at most for the configured lookup wait time.
    pub fn vl_cursor(&self) -> Result<AddressCursor, AddrListError> {
        self.stats.add_cursor_total();
        self.bind_cursor().inspect_err(|e| {
            if *e == AddrListError::NoDestination {
                self.stats.add_cursor_no_dest();
            }
        })
    }

    fn bind_cursor(&self) -> Result<AddressCursor, AddrListError> {
        if self.vl_addrs.load().is_none() {
            let state = self.lookup.lock().unwrap();
            let (state, _) = self
                .lookup_cond
                .wait_timeout_while(state, self.config.lookup_wait(), |s| !s.done)
                .unwrap();
            if !state.done {
                return Err(AddrListError::LookupTimedOut);
            }

            if self.vl_addrs.load().is_none() {
                if let (Some(expiry), Some(e)) = (state.dns_expiry, &state.error) {
                    if Instant::now() < expiry {
                        return Err(e.clone());
                    }
                }
                return Err(AddrListError::NoDestination);
            }
        }

        match self.vl_addrs.load_full() {
            Some(alist) if !alist.is_empty() => AddressCursor::new(alist),
            _ => Err(AddrListError::NoDestination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResolverError, StaticRecordResolver};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn new_group(name: &str) -> ServerGroup {
        let mut config = ServerGroupConfig::new(name);
        config.set_lookup_wait(Duration::from_millis(10));
        ServerGroup::new(config)
    }

    #[test]
    fn no_lookup_yet() {
        let group = new_group("example.org");
        assert!(group.need_lookup(Instant::now()));
        assert!(group.load_vl_addrs().is_none());
        assert_eq!(
            group.vl_cursor().unwrap_err(),
            AddrListError::LookupTimedOut
        );
    }

    #[test]
    fn lookup_and_cursor() {
        let mut resolver = StaticRecordResolver::new();
        resolver.insert("example.org", "10.0.0.1,10.0.0.2", Duration::from_secs(300));

        let group = new_group("example.org");
        group.update_vl_addrs(&resolver).unwrap();
        assert!(!group.need_lookup(Instant::now()));
        assert!(group.need_lookup(Instant::now() + Duration::from_secs(301)));
        assert!(group.last_error().is_none());

        let mut cursor = group.vl_cursor().unwrap();
        assert!(cursor.iterate());
        assert!(cursor.iterate());
        cursor.mark_responded();
        assert_eq!(cursor.release(), Ok(()));
        assert_eq!(group.load_vl_addrs().unwrap().preferred_index(), 1);

        let snap = group.stats().snapshot();
        assert_eq!(snap.lookup_total, 1);
        assert_eq!(snap.cursor_total, 1);
    }

    #[test]
    fn unchanged_keeps_hint() {
        let mut resolver = StaticRecordResolver::new();
        resolver.insert("example.org", "10.0.0.1,10.0.0.2", Duration::from_secs(300));

        let group = new_group("example.org");
        group.update_vl_addrs(&resolver).unwrap();
        let first = group.load_vl_addrs().unwrap();
        first.set_preferred_index(1);

        resolver.insert("example.org", "10.0.0.2,10.0.0.1", Duration::from_secs(300));
        group.update_vl_addrs(&resolver).unwrap();
        let second = group.load_vl_addrs().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.preferred_index(), 1);
        assert_eq!(group.stats().snapshot().lookup_unchanged, 1);

        resolver.insert("example.org", "10.0.0.3", Duration::from_secs(300));
        group.update_vl_addrs(&resolver).unwrap();
        let third = group.load_vl_addrs().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.preferred_index(), 0);
    }

    #[test]
    fn failed_first_lookup() {
        let resolver = StaticRecordResolver::new();
        let group = new_group("example.org");
        assert_eq!(
            group.update_vl_addrs(&resolver).unwrap_err(),
            AddrListError::Resolver(ResolverError::NotFound)
        );
        assert_eq!(
            group.vl_cursor().unwrap_err(),
            AddrListError::Resolver(ResolverError::NotFound)
        );

        let mut config = ServerGroupConfig::new("example.org");
        config.set_negative_ttl(Duration::ZERO);
        let group = ServerGroup::new(config);
        assert!(group.update_vl_addrs(&resolver).is_err());
        assert_eq!(group.vl_cursor().unwrap_err(), AddrListError::NoDestination);
        assert_eq!(group.stats().snapshot().cursor_no_dest, 1);
    }

    #[test]
    fn failed_refresh_keeps_list() {
        let mut resolver = StaticRecordResolver::new();
        resolver.insert("example.org", "10.0.0.1", Duration::from_secs(300));

        let group = new_group("example.org");
        group.update_vl_addrs(&resolver).unwrap();

        resolver.insert("example.org", "garbage", Duration::from_secs(300));
        assert!(group.update_vl_addrs(&resolver).is_err());
        assert!(group.last_error().unwrap().is_format_error());
        assert_eq!(group.load_vl_addrs().unwrap().len(), 1);
        assert!(group.vl_cursor().is_ok());

        let snap = group.stats().snapshot();
        assert_eq!(snap.lookup_total, 2);
        assert_eq!(snap.lookup_failed, 1);
        assert_eq!(snap.lookup_malformed, 1);
    }

    #[test]
    fn install_and_update_interleaved() {
        use std::thread;

        let mut resolver = StaticRecordResolver::new();
        resolver.insert("example.org", "10.0.0.1,10.0.0.2", Duration::from_secs(300));

        let group = Arc::new(new_group("example.org"));
        let installer = {
            let group = Arc::clone(&group);
            thread::spawn(move || {
                for i in 0..200u32 {
                    let mut alist = AddressList::allocate(1, 1, 1).unwrap();
                    alist.merge_ipv4(Ipv4Addr::from(0x0a01_0000 + i), 1);
                    group.install_vl_addrs(alist.into_shared(), Instant::now());
                }
            })
        };
        for _ in 0..200 {
            group.update_vl_addrs(&resolver).unwrap();
        }
        installer.join().unwrap();

        // a manual install followed by a lookup of the same record
        let mut alist = AddressList::allocate(1, 1, 1).unwrap();
        alist.merge_ipv4(Ipv4Addr::LOCALHOST, 1);
        group.install_vl_addrs(alist.into_shared(), Instant::now());
        group.update_vl_addrs(&resolver).unwrap();
        assert_eq!(group.load_vl_addrs().unwrap().len(), 2);
        assert!(group.last_error().is_none());
        assert_eq!(group.stats().snapshot().lookup_total, 201);
    }

    #[test]
    fn empty_list_installed() {
        let group = new_group("example.org");
        let alist = AddressList::allocate(1, 1, 1).unwrap().into_shared();
        group.install_vl_addrs(alist, Instant::now());
        assert_eq!(group.vl_cursor().unwrap_err(), AddrListError::NoDestination);

        let mut alist = AddressList::allocate(1, 1, 1).unwrap();
        alist.merge_ipv4(Ipv4Addr::LOCALHOST, 1);
        group.install_vl_addrs(alist.into_shared(), Instant::now());
        assert!(group.vl_cursor().is_ok());
    }
}
