/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use log::debug;
use memchr::{memchr, memchr2};

use super::{AddrListError, AddressList, MAX_ADDRESSES};

/// Delimiter of the legacy format, shared with the IPv6 group separator.
pub const DEFAULT_DELIMITER: u8 = b':';
/// Delimiter of address lists in DNS records.
pub const LIST_DELIMITER: u8 = b',';

#[inline]
fn invalid(offset: usize) -> AddrListError {
    AddrListError::InvalidFormat { offset }
}

/// A ':' delimited text without any '.' can only be a single IPv6 literal,
/// and a text with ',' in it is a comma delimited list.
fn effective_delimiter(buf: &[u8], delim: u8) -> u8 {
    if delim == DEFAULT_DELIMITER
        && (memchr(LIST_DELIMITER, buf).is_some() || memchr(b'.', buf).is_none())
    {
        LIST_DELIMITER
    } else {
        delim
    }
}

fn count_addrs(buf: &[u8], delim: u8) -> Result<usize, AddrListError> {
    let end = buf.len();
    let mut nr = 0usize;
    let mut p = 0usize;

    while p < end {
        if buf[p] == 0 {
            return Err(invalid(p));
        }
        if buf[p] == delim {
            p += 1;
            continue;
        }

        nr += 1;
        if buf[p] == b'[' {
            p += 1;
            if p == end {
                return Err(invalid(p));
            }
            let Some(pos) = memchr(b']', &buf[p..]) else {
                return Err(invalid(p));
            };
            p += pos + 1;
            if p >= end {
                break;
            }
        }

        match memchr(delim, &buf[p..]) {
            Some(pos) => p += pos + 1,
            None => break,
        }
    }

    Ok(nr)
}

/// Dotted decimal with exactly four parts, each at most 255.
///
/// Leading zeros are allowed and the parts stay decimal, so "010.0.0.1" is
/// 10.0.0.1.
fn parse_ipv4(host: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = host.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() {
            return None;
        }
        let mut v = 0u16;
        for c in part.bytes() {
            if !c.is_ascii_digit() {
                return None;
            }
            v = v * 10 + (c - b'0') as u16;
            if v > u8::MAX as u16 {
                return None;
            }
        }
        *octet = v as u8;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

fn parse_host(host: &str) -> Option<IpAddr> {
    if let Some(ip4) = parse_ipv4(host) {
        return Some(IpAddr::V4(ip4));
    }
    if let Ok(ip6) = Ipv6Addr::from_str(host) {
        return Some(IpAddr::V6(ip6));
    }
    None
}

/// Parse the decimal digits of a "+port" suffix, return the port and the
/// offset right after the last digit.
fn parse_port(buf: &[u8], mut p: usize) -> Result<(u16, usize), AddrListError> {
    if p >= buf.len() || !buf[p].is_ascii_digit() {
        return Err(invalid(p));
    }

    let mut port = 0u32;
    while p < buf.len() && buf[p].is_ascii_digit() {
        port = port * 10 + (buf[p] - b'0') as u32;
        if port > u16::MAX as u32 {
            return Err(invalid(p));
        }
        p += 1;
    }
    Ok((port as u16, p))
}

fn extract_addrs(text: &str, delim: u8, alist: &mut AddressList) -> Result<(), AddrListError> {
    let buf = text.as_bytes();
    let end = buf.len();
    let mut p = 0usize;

    while p < end {
        if buf[p] == delim {
            p += 1;
            continue;
        }

        let q = if buf[p] == b'[' {
            p += 1;
            match memchr(b']', &buf[p..]) {
                Some(pos) => p + pos,
                None => return Err(invalid(p)),
            }
        } else {
            memchr2(b'+', delim, &buf[p..])
                .map(|pos| p + pos)
                .unwrap_or(end)
        };

        let ip = text
            .get(p..q)
            .and_then(parse_host)
            .ok_or_else(|| invalid(p))?;

        p = q;
        if q < end && buf[q] == b']' {
            p += 1;
        }

        let mut port = alist.port();
        if p < end {
            if buf[p] == b'+' {
                let (v, next) = parse_port(buf, p + 1)?;
                port = v;
                p = next;
            } else if buf[p] == delim {
                p += 1;
            } else {
                return Err(invalid(p));
            }
        }

        alist.merge_ip(ip, port);
    }

    Ok(())
}

/// Parse a text string consisting of delimited addresses.
///
/// Each address is an IPv4 or IPv6 literal, optionally in square brackets,
/// optionally followed by `+port`. Addresses without a port get `port`.
/// On any malformed address the whole text is rejected.
pub fn parse_text_addrs(
    text: &str,
    delim: u8,
    service_id: u16,
    port: u16,
) -> Result<AddressList, AddrListError> {
    if text.is_empty() {
        return Err(AddrListError::NoDestination);
    }

    let buf = text.as_bytes();
    let delim = effective_delimiter(buf, delim);

    let nr = count_addrs(buf, delim)?;
    if nr == 0 {
        return Err(AddrListError::NoDestination);
    }
    debug!("{nr}/{MAX_ADDRESSES} addresses");

    let mut alist = AddressList::allocate(nr, service_id, port)?;
    extract_addrs(text, delim, &mut alist)?;

    debug!("parsed address list of {} entries", alist.len());
    Ok(alist)
}
