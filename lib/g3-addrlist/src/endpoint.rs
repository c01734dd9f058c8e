/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Service id of the volume location servers.
pub const VL_SERVICE_ID: u16 = 52;
/// Default UDP port of the volume location servers.
pub const VL_PORT: u16 = 7003;
/// Service id of the file servers.
pub const FS_SERVICE_ID: u16 = 1;
/// Default UDP port of the file servers.
pub const FS_PORT: u16 = 7000;

/// A single transport address together with the RPC service it serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    service_id: u16,
    addr: SocketAddr,
}

impl Endpoint {
    pub fn new(service_id: u16, addr: SocketAddr) -> Self {
        Endpoint { service_id, addr }
    }

    #[inline]
    pub fn service_id(&self) -> u16 {
        self.service_id
    }

    #[inline]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[inline]
    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    #[inline]
    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.service_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display() {
        let ep = Endpoint::new(VL_SERVICE_ID, SocketAddr::from_str("10.0.0.1:7003").unwrap());
        assert!(ep.is_ipv4());
        assert_eq!(ep.to_string(), "10.0.0.1:7003/52");

        let ep = Endpoint::new(FS_SERVICE_ID, SocketAddr::from_str("[::1]:7000").unwrap());
        assert!(!ep.is_ipv4());
        assert_eq!(ep.port(), FS_PORT);
        assert_eq!(ep.to_string(), "[::1]:7000/1");
    }
}
