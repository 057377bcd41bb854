//! Address and prefix helpers for the forwarding table

use crate::constants::ADDR_BITS;
use crate::errors::Error;
use std::net::Ipv4Addr;

#[inline]
pub fn addr_to_int(addr: Ipv4Addr) -> u32 {
    u32::from(addr)
}

#[inline]
pub fn int_to_addr(value: u32) -> Ipv4Addr {
    Ipv4Addr::from(value)
}

/// Parse a dotted-quad string.
pub fn parse_addr(s: &str) -> Result<Ipv4Addr, Error> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| Error::MalformedAddress(s.to_string()))
}

#[inline]
pub fn mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else if prefix_len >= ADDR_BITS {
        !0u32
    } else {
        !(!0u32 >> prefix_len)
    }
}

/// Number of leading 1-bits in `netmask`.
///
/// Rejects masks whose 1-bits are not contiguous from the top
/// (e.g. `255.0.255.0`).
pub fn prefix_length(netmask: Ipv4Addr) -> Result<u8, Error> {
    let m = addr_to_int(netmask);
    let len = m.leading_ones();
    if m.checked_shl(len).unwrap_or(0) != 0 {
        return Err(Error::InvalidNetmask(netmask));
    }
    Ok(len as u8)
}

#[inline]
pub fn canonical_netmask(prefix_len: u8) -> Ipv4Addr {
    int_to_addr(mask(prefix_len))
}

// Zero host bits beyond `prefix_len`.
#[inline]
pub fn masked_prefix(network: Ipv4Addr, prefix_len: u8) -> u32 {
    addr_to_int(network) & mask(prefix_len)
}

/// Bit `index` of `key`, counted from the most significant bit.
#[inline]
pub fn get_bit(key: u32, index: u8) -> usize {
    debug_assert!(index < ADDR_BITS);
    ((key >> (ADDR_BITS - 1 - index)) & 1) as usize
}

/// `network/len` notation, falling back to the raw mask when it is not contiguous.
pub fn cidr_repr(network: Ipv4Addr, netmask: Ipv4Addr) -> String {
    match prefix_length(netmask) {
        Ok(len) => format!("{network}/{len}"),
        Err(_) => format!("{network}/{netmask}"),
    }
}
