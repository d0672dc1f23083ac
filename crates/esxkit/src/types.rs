//! Core types for ESXi host networking.

use std::fmt;
use std::net::IpAddr;

/// A physical network adapter (`vmnicN`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nic {
    /// Adapter name, e.g. `vmnic0`
    pub name: String,
    /// Hardware address, lowercase and colon-separated
    pub mac_address: String,
}

/// IP address family, as esxcli spells it in command paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    /// `ipv4`
    V4,
    /// `ipv6`
    V6,
}

impl IpFamily {
    /// Family of an address.
    pub fn of(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// The esxcli namespace segment (`ipv4` / `ipv6`).
    pub fn as_str(&self) -> &'static str {
        match self {
            IpFamily::V4 => "ipv4",
            IpFamily::V6 => "ipv6",
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// vSwitch load-balancing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBalancing {
    /// Route based on originating virtual port id
    PortId,
    /// Route based on IP hash (needs a static link aggregation on the switch side)
    IpHash,
    /// Use the explicit failover order
    Explicit,
}

impl LoadBalancing {
    /// The token esxcli expects for `--load-balancing`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancing::PortId => "portid",
            LoadBalancing::IpHash => "iphash",
            LoadBalancing::Explicit => "explicit",
        }
    }
}

impl fmt::Display for LoadBalancing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failover/load-balancing policy for a standard vSwitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverPolicy {
    /// Load-balancing algorithm
    pub load_balancing: LoadBalancing,
    /// Active uplinks, in priority order
    pub active: Vec<String>,
    /// Standby uplinks, in priority order
    pub standby: Vec<String>,
}

/// Parameters for creating a VMkernel interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmknicSpec {
    /// Interface name, e.g. `vmk0`
    pub name: String,
    /// Port group the interface attaches to
    pub portgroup: String,
    /// Interface MTU
    pub mtu: Option<u32>,
    /// Hardware address to assign
    pub mac_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_of() {
        assert_eq!(IpFamily::of(&"10.0.0.1".parse().unwrap()), IpFamily::V4);
        assert_eq!(IpFamily::of(&"fe80::1".parse().unwrap()), IpFamily::V6);
        assert_eq!(IpFamily::V6.to_string(), "ipv6");
    }

    #[test]
    fn test_load_balancing_tokens() {
        assert_eq!(LoadBalancing::PortId.as_str(), "portid");
        assert_eq!(LoadBalancing::IpHash.as_str(), "iphash");
        assert_eq!(LoadBalancing::Explicit.as_str(), "explicit");
    }
}
