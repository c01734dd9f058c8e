/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::cmp::Ordering;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::{AddressList, Endpoint};

impl AddressList {
    /// Merge an IPv4 entry into the list.
    ///
    /// Nothing happens if the list is full or the entry is already present.
    pub fn merge_ipv4(&mut self, addr: Ipv4Addr, port: u16) {
        if self.is_full() {
            return;
        }

        let new_addr = u32::from(addr);
        let mut i = 0;
        while i < self.nr_ipv4 {
            let a = &self.addrs[i];
            let a_addr = match a.ip() {
                IpAddr::V4(ip4) => u32::from(ip4),
                IpAddr::V6(_) => break,
            };
            let a_port = a.port();

            if new_addr == a_addr {
                match port.cmp(&a_port) {
                    Ordering::Equal => return,
                    Ordering::Less => break,
                    Ordering::Greater => {}
                }
            } else if new_addr < a_addr {
                break;
            }
            i += 1;
        }

        let ep = Endpoint::new(self.service_id(), SocketAddr::new(IpAddr::V4(addr), port));
        self.addrs.insert(i, ep);
        self.nr_ipv4 += 1;
    }

    /// Merge an IPv6 entry into the list.
    ///
    /// Nothing happens if the list is full or the entry is already present.
    pub fn merge_ipv6(&mut self, addr: Ipv6Addr, port: u16) {
        if self.is_full() {
            return;
        }

        let new_octets = addr.octets();
        let mut i = self.nr_ipv4;
        while i < self.addrs.len() {
            let a = &self.addrs[i];
            let diff = match a.ip() {
                IpAddr::V6(ip6) => new_octets.cmp(&ip6.octets()),
                IpAddr::V4(_) => Ordering::Less,
            };
            let a_port = a.port();

            match diff {
                Ordering::Equal => match port.cmp(&a_port) {
                    Ordering::Equal => return,
                    Ordering::Less => break,
                    Ordering::Greater => {}
                },
                Ordering::Less => break,
                Ordering::Greater => {}
            }
            i += 1;
        }

        let ep = Endpoint::new(self.service_id(), SocketAddr::new(IpAddr::V6(addr), port));
        self.addrs.insert(i, ep);
    }

    pub fn merge_ip(&mut self, ip: IpAddr, port: u16) {
        match ip {
            IpAddr::V4(ip4) => self.merge_ipv4(ip4, port),
            IpAddr::V6(ip6) => self.merge_ipv6(ip6, port),
        }
    }

    pub fn merge_socket_addr(&mut self, addr: SocketAddr) {
        self.merge_ip(addr.ip(), addr.port())
    }
}
