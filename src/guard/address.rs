// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification of resolved addresses into public and non-public space

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Hostnames rejected before any resolution happens
const FORBIDDEN_HOSTNAMES: &[&str] = &["localhost", "0.0.0.0"];

/// Check whether a literal hostname is rejected without resolving it
///
/// Matches `localhost`, `0.0.0.0` and anything under `.local`, ignoring
/// case and a trailing root dot.
pub fn is_forbidden_hostname(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    FORBIDDEN_HOSTNAMES.contains(&host.as_str())
        || host.ends_with(".localhost")
        || host.ends_with(".local")
}

/// Check whether an address lies outside publicly routable space
pub fn is_non_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_non_public_v4(v4),
        IpAddr::V6(v6) => is_non_public_v6(v6),
    }
}

/// Loopback check that also sees through IPv4-mapped IPv6 addresses
pub fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
        }
    }
}

fn is_non_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();

    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_unspecified()
        // 0.0.0.0/8 "this network"
        || a == 0
        || ip.is_documentation()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240
}

/// IPv4 address carried inside an IPv6 one
///
/// Covers IPv4-mapped (`::ffff:0:0/96`), IPv4-compatible (`::/96`), the
/// NAT64 well-known prefix (`64:ff9b::/96`) and 6to4 (`2002::/16`).
fn embedded_ipv4(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return Some(v4);
    }

    let s = ip.segments();
    let join = |hi: u16, lo: u16| Ipv4Addr::from(((hi as u32) << 16) | lo as u32);
    match s {
        [0, 0, 0, 0, 0, 0, hi, lo] => Some(join(hi, lo)),
        [0x0064, 0xff9b, 0, 0, 0, 0, hi, lo] => Some(join(hi, lo)),
        [0x2002, hi, lo, ..] => Some(join(hi, lo)),
        _ => None,
    }
}

fn is_non_public_v6(ip: Ipv6Addr) -> bool {
    // `::` and `::1` land here as 0.0.0.0/8, which is non-public too
    if let Some(v4) = embedded_ipv4(ip) {
        return is_non_public_v4(v4);
    }

    let [first, second, ..] = ip.segments();

    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link-local unicast
        || (first & 0xffc0) == 0xfe80
        // fec0::/10 deprecated site-local
        || (first & 0xffc0) == 0xfec0
        // 2001:db8::/32 documentation
        || (first == 0x2001 && second == 0x0db8)
}
