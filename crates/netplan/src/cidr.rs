//! CIDR address value type.
//!
//! Network documents carry addresses as `address/prefix` strings, or as a
//! bare address plus a dotted netmask. Both forms end up as a [`Cidr`].

use crate::error::{Error, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An IP address together with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    /// The address itself, host bits included
    pub address: IpAddr,
    /// Number of leading network bits
    pub prefix_len: u8,
}

impl Cidr {
    /// Create a CIDR, validating the prefix length for the address family.
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self> {
        let max = if address.is_ipv4() { 32 } else { 128 };
        if prefix_len > max {
            return Err(Error::invalid_cidr(
                &format!("{address}/{prefix_len}"),
                format!("prefix length must be <= {max}"),
            ));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }

    /// Build a CIDR from a bare address and a netmask.
    ///
    /// The netmask may be dotted (`255.255.255.0`) or a prefix length (`24`).
    pub fn with_netmask(address: &str, netmask: &str) -> Result<Self> {
        let addr: IpAddr = address
            .trim()
            .parse()
            .map_err(|e| Error::invalid_cidr(address, format!("{e}")))?;
        let prefix_len = parse_netmask(netmask)?;
        Self::new(addr, prefix_len)
    }

    /// Whether this is an IPv4 address.
    pub fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// The netmask as esxcli prints it: dotted for IPv4, prefix length for IPv6.
    pub fn netmask(&self) -> String {
        match self.address {
            IpAddr::V4(_) => Ipv4Addr::from(v4_mask(self.prefix_len)).to_string(),
            IpAddr::V6(_) => self.prefix_len.to_string(),
        }
    }

    /// The network address (host bits cleared).
    pub fn network(&self) -> IpAddr {
        match self.address {
            IpAddr::V4(a) => IpAddr::V4(Ipv4Addr::from(u32::from(a) & v4_mask(self.prefix_len))),
            IpAddr::V6(a) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix_len)).unwrap_or(0);
                IpAddr::V6(Ipv6Addr::from(u128::from(a) & mask))
            }
        }
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix_len)).unwrap_or(0)
}

/// Convert a dotted or numeric netmask into a prefix length.
fn parse_netmask(netmask: &str) -> Result<u8> {
    let netmask = netmask.trim();
    if let Ok(prefix) = netmask.parse::<u8>() {
        return Ok(prefix);
    }

    let mask: Ipv4Addr = netmask
        .parse()
        .map_err(|_| Error::invalid_cidr(netmask, "not a netmask"))?;
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) != 0 {
        return Err(Error::invalid_cidr(netmask, "netmask is not contiguous"));
    }
    Ok(ones as u8)
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| Error::invalid_cidr(s, "missing prefix length"))?;

        let address: IpAddr = addr
            .parse()
            .map_err(|e| Error::invalid_cidr(s, format!("{e}")))?;
        let prefix_len: u8 = prefix
            .parse()
            .map_err(|e| Error::invalid_cidr(s, format!("invalid prefix length: {e}")))?;

        Self::new(address, prefix_len)
    }
}
