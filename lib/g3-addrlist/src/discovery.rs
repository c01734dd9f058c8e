/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::{Duration, Instant};

use ahash::AHashMap;
use log::{debug, error};

use super::{AddrListError, AddressList, LIST_DELIMITER, ResolverError, parse_text_addrs};

/// Record type queried for the volume location servers of a server group.
pub const VL_QUERY_TYPE: &str = "afsdb";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedText {
    /// Raw record data, comma delimited address text.
    pub text: Vec<u8>,
    /// Time after which the record should be looked up again.
    pub expiry: Instant,
}

/// Source of address records, usually backed by DNS.
pub trait RecordResolver {
    fn resolve(&self, query_type: &str, name: &str) -> Result<ResolvedText, ResolverError>;
}

/// Look up the address record of `name` and build an address list from it.
///
/// Resolver errors are returned as is. A record that can be fetched but not
/// parsed is reported once here, the caller only gets the parse error.
pub fn resolve_and_build<R>(
    resolver: &R,
    name: &str,
    service_id: u16,
    port: u16,
) -> Result<(AddressList, Instant), AddrListError>
where
    R: RecordResolver + ?Sized,
{
    let record = resolver.resolve(VL_QUERY_TYPE, name)?;
    debug!(
        "got {VL_QUERY_TYPE} record for {name}: {}",
        String::from_utf8_lossy(&record.text)
    );

    let text = match std::str::from_utf8(&record.text) {
        Ok(text) => text,
        Err(e) => {
            let offset = e.valid_up_to();
            error!("non utf-8 {VL_QUERY_TYPE} record data for {name} at offset {offset}");
            return Err(AddrListError::InvalidFormat { offset });
        }
    };

    match parse_text_addrs(text, LIST_DELIMITER, service_id, port) {
        Ok(alist) => Ok((alist, record.expiry)),
        Err(e) => {
            if e != AddrListError::AllocationFailure {
                error!("failed to parse {VL_QUERY_TYPE} record data for {name}: {e}");
            }
            Err(e)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct StaticRecord {
    text: String,
    ttl: Duration,
}

/// Resolver serving records configured in advance.
#[derive(Clone, Debug, Default)]
pub struct StaticRecordResolver {
    records: AHashMap<String, StaticRecord>,
}

impl StaticRecordResolver {
    pub fn new() -> Self {
        StaticRecordResolver::default()
    }

    pub fn insert(&mut self, name: &str, text: &str, ttl: Duration) {
        self.records.insert(
            name.to_string(),
            StaticRecord {
                text: text.to_string(),
                ttl,
            },
        );
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.records.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordResolver for StaticRecordResolver {
    fn resolve(&self, _query_type: &str, name: &str) -> Result<ResolvedText, ResolverError> {
        match self.records.get(name) {
            Some(r) => Ok(ResolvedText {
                text: r.text.as_bytes().to_vec(),
                expiry: Instant::now() + r.ttl,
            }),
            None => Err(ResolverError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{VL_PORT, VL_SERVICE_ID};

    struct FailingResolver(ResolverError);

    impl RecordResolver for FailingResolver {
        fn resolve(&self, _query_type: &str, _name: &str) -> Result<ResolvedText, ResolverError> {
            Err(self.0.clone())
        }
    }

    #[test]
    fn build_ok() {
        let mut resolver = StaticRecordResolver::new();
        resolver.insert("example.org", "10.0.0.2,10.0.0.1", Duration::from_secs(60));
        assert_eq!(resolver.len(), 1);

        let before = Instant::now();
        let (alist, expiry) =
            resolve_and_build(&resolver, "example.org", VL_SERVICE_ID, VL_PORT).unwrap();
        assert_eq!(alist.len(), 2);
        assert_eq!(alist.get(0).unwrap().to_string(), "10.0.0.1:7003/52");
        assert!(expiry >= before + Duration::from_secs(60));
    }

    #[test]
    fn resolver_error_passed_through() {
        let resolver = FailingResolver(ResolverError::Timeout);
        let e = resolve_and_build(&resolver, "example.org", VL_SERVICE_ID, VL_PORT).unwrap_err();
        assert_eq!(e, AddrListError::Resolver(ResolverError::Timeout));
        assert!(!e.is_format_error());

        let resolver = StaticRecordResolver::new();
        let e = resolve_and_build(&resolver, "example.org", VL_SERVICE_ID, VL_PORT).unwrap_err();
        assert_eq!(e, AddrListError::Resolver(ResolverError::NotFound));
    }

    struct RawResolver(Vec<u8>);

    impl RecordResolver for RawResolver {
        fn resolve(&self, _query_type: &str, _name: &str) -> Result<ResolvedText, ResolverError> {
            Ok(ResolvedText {
                text: self.0.clone(),
                expiry: Instant::now(),
            })
        }
    }

    #[test]
    fn non_utf8_record() {
        let resolver = RawResolver(b"10.0.0.1,\xff10.0.0.2".to_vec());
        let e = resolve_and_build(&resolver, "example.org", VL_SERVICE_ID, VL_PORT).unwrap_err();
        assert_eq!(e, AddrListError::InvalidFormat { offset: 9 });
        assert!(e.is_format_error());

        let resolver = RawResolver(b"10.0.0.1,[::1]+7000".to_vec());
        let (alist, _) =
            resolve_and_build(&resolver, "example.org", VL_SERVICE_ID, VL_PORT).unwrap();
        assert_eq!(alist.len(), 2);
    }

    #[test]
    fn malformed_record() {
        let mut resolver = StaticRecordResolver::new();
        resolver.insert("bad.example.org", "10.0.0.1,bad", Duration::from_secs(60));
        resolver.insert("empty.example.org", "", Duration::from_secs(60));

        let e =
            resolve_and_build(&resolver, "bad.example.org", VL_SERVICE_ID, VL_PORT).unwrap_err();
        assert!(matches!(e, AddrListError::InvalidFormat { .. }));

        let dyn_resolver: &dyn RecordResolver = &resolver;
        let e = resolve_and_build(dyn_resolver, "empty.example.org", VL_SERVICE_ID, VL_PORT)
            .unwrap_err();
        assert_eq!(e, AddrListError::NoDestination);

        assert!(resolver.remove("bad.example.org"));
        assert!(!resolver.remove("bad.example.org"));
    }
}
