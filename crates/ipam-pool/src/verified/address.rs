//! Address arithmetic for candidate scanning.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

/// Increment a big-endian byte array by one.
///
/// The last byte is incremented and any carry propagates leftward. An array of
/// all `0xff` wraps to all zeros. The input is taken by value and never
/// modified in place by the caller's binding.
///
/// # Example
///
/// ```ignore
/// assert_eq!(increment_octets([10, 0, 0, 255]), [10, 0, 1, 0]);
/// ```
#[inline]
pub fn increment_octets<const N: usize>(mut octets: [u8; N]) -> [u8; N] {
    for byte in octets.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
    octets
}

/// Next IPv4 address, wrapping from `255.255.255.255` to `0.0.0.0`.
#[inline]
pub fn increment_addr(addr: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(increment_octets(addr.octets()))
}

/// Number of assignable host addresses in a network of `prefix_len`.
///
/// The network and broadcast addresses are excluded, so /31 and /32 have none.
#[inline]
pub fn usable_count(prefix_len: u8) -> u32 {
    if prefix_len >= 31 {
        return 0;
    }
    let size = 1u64 << (32 - u32::from(prefix_len));
    (size - 2) as u32
}

/// Iterator over the assignable hosts of a network, lowest first.
#[derive(Debug, Clone)]
pub struct UsableHosts {
    next: Ipv4Addr,
    remaining: u32,
}

impl Iterator for UsableHosts {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.next = increment_addr(current);
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

/// Candidates from `network + 1` up to, not including, the broadcast address.
pub fn usable_hosts(network: Ipv4Net) -> UsableHosts {
    let network = network.trunc();
    UsableHosts {
        next: increment_addr(network.network()),
        remaining: usable_count(network.prefix_len()),
    }
}

/// Format `address` with the pool's prefix length.
#[inline]
pub fn format_address(address: Ipv4Addr, prefix_len: u8) -> Ipv4Net {
    Ipv4Net::new(address, prefix_len).unwrap_or_else(|_| Ipv4Net::from(address))
}
