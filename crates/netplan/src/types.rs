//! Network document model.
//!
//! Devices are decoded through a flat [`RawDevice`] and then split into a
//! tagged [`Device`] enum, so each device type only carries the fields that
//! make sense for it. Unknown device and subnet types are kept rather than
//! rejected; deciding what to do with them is the caller's business.

use crate::cidr::Cidr;
use crate::error::Result;
use serde::{Deserialize, Deserializer};

/// A complete version-1 network document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    pub version: u64,
    #[serde(default, alias = "devices")]
    pub config: Vec<Device>,
}

impl NetworkConfig {
    /// Iterate over physical devices only.
    pub fn physical(&self) -> impl Iterator<Item = &Interface> {
        self.config.iter().filter_map(|d| match d {
            Device::Physical(iface) => Some(iface),
            _ => None,
        })
    }
}

/// A configured device, one variant per device type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDevice")]
pub enum Device {
    Physical(Interface),
    Bond(Bond),
    Vlan(Vlan),
    Nameserver(Nameservers),
    /// A device type this crate does not know about
    Unknown { kind: String, name: Option<String> },
}

impl Device {
    /// Logical id used by other devices to reference this one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Device::Physical(iface) => Some(&iface.id),
            Device::Bond(bond) => Some(&bond.interface.id),
            Device::Vlan(vlan) => Some(&vlan.interface.id),
            Device::Nameserver(_) => None,
            Device::Unknown { name, .. } => name.as_deref(),
        }
    }

    /// Device type as written in the document.
    pub fn kind(&self) -> &str {
        match self {
            Device::Physical(_) => "physical",
            Device::Bond(_) => "bond",
            Device::Vlan(_) => "vlan",
            Device::Nameserver(_) => "nameserver",
            Device::Unknown { kind, .. } => kind,
        }
    }
}

/// Fields shared by every addressable device (physical, bond, vlan).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Logical id; defaults to the name
    pub id: String,
    /// Display name, used for port group names
    pub name: String,
    pub mtu: Option<u32>,
    pub mac_address: Option<String>,
    pub subnets: Vec<Subnet>,
}

impl Interface {
    /// Subnets that produce IP configuration (everything except `manual`).
    pub fn addressable_subnets(&self) -> impl Iterator<Item = &Subnet> {
        self.subnets
            .iter()
            .filter(|s| !matches!(s.kind, SubnetKind::Manual))
    }

    /// Whether the device has at least one non-manual subnet.
    pub fn has_addressing(&self) -> bool {
        self.addressable_subnets().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub interface: Interface,
    /// Member device ids, in priority order
    pub members: Vec<String>,
    pub params: BondParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vlan {
    pub interface: Interface,
    /// Parent device id
    pub link: String,
    pub vlan_id: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nameservers {
    pub addresses: Vec<String>,
    pub search: Vec<String>,
}

/// Linux bonding parameters as found under a bond's `params` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BondParams {
    #[serde(default, rename = "bond-mode", alias = "mode")]
    pub mode: Option<String>,
    #[serde(default, rename = "bond-lacp-rate", alias = "lacp-rate")]
    pub lacp_rate: Option<String>,
    #[serde(default, rename = "bond-xmit-hash-policy", alias = "xmit-hash-policy")]
    pub xmit_hash_policy: Option<String>,
    #[serde(default, rename = "bond-miimon", alias = "miimon")]
    pub miimon: Option<u32>,
}

impl BondParams {
    /// The bonding mode; Linux defaults to `balance-rr` when unset.
    pub fn bond_mode(&self) -> BondMode {
        self.mode
            .as_deref()
            .map_or(BondMode::BalanceRr, BondMode::from)
    }
}

/// Linux bonding mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondMode {
    BalanceRr,
    ActiveBackup,
    /// `802.3ad` (LACP)
    Lacp,
    Other(String),
}

impl From<&str> for BondMode {
    fn from(s: &str) -> Self {
        match s.trim() {
            "balance-rr" | "0" => BondMode::BalanceRr,
            "active-backup" | "1" => BondMode::ActiveBackup,
            "802.3ad" | "4" => BondMode::Lacp,
            other => BondMode::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for BondMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BondMode::BalanceRr => write!(f, "balance-rr"),
            BondMode::ActiveBackup => write!(f, "active-backup"),
            BondMode::Lacp => write!(f, "802.3ad"),
            BondMode::Other(mode) => write!(f, "{mode}"),
        }
    }
}

/// Subnet type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SubnetKind {
    Static,
    Dhcp4,
    Dhcp6,
    Manual,
    Other(String),
}

impl From<String> for SubnetKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "static" | "static6" => SubnetKind::Static,
            "dhcp" | "dhcp4" => SubnetKind::Dhcp4,
            "dhcp6" => SubnetKind::Dhcp6,
            "manual" => SubnetKind::Manual,
            _ => SubnetKind::Other(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subnet {
    #[serde(rename = "type")]
    pub kind: SubnetKind,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl Subnet {
    /// The subnet address as CIDR, folding in a separate `netmask` if given.
    ///
    /// Returns `None` when the subnet has no address at all.
    pub fn cidr(&self) -> Option<Result<Cidr>> {
        let address = self.address.as_deref()?;
        Some(match (&self.netmask, address.contains('/')) {
            (Some(netmask), false) => Cidr::with_netmask(address, netmask),
            _ => address.parse(),
        })
    }
}

/// A static route. Both fields are optional in the document so that an
/// incomplete entry can be reported instead of failing the whole load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Route {
    #[serde(default, alias = "destination", alias = "to")]
    pub network: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default, alias = "via")]
    pub gateway: Option<String>,
}

impl Route {
    /// The destination network as CIDR, or `None` if unset.
    pub fn destination(&self) -> Option<Result<Cidr>> {
        let network = self.network.as_deref()?;
        Some(match (&self.netmask, network.contains('/')) {
            (Some(netmask), false) => Cidr::with_netmask(network, netmask),
            _ => network.parse(),
        })
    }
}

// ============================================================================
// Raw decoding
// ============================================================================

/// Flat shape of a device entry as it appears in the document.
#[derive(Debug, Deserialize)]
struct RawDevice {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mtu: Option<u32>,
    #[serde(default, alias = "mac")]
    mac_address: Option<String>,
    #[serde(default)]
    subnets: Vec<Subnet>,
    #[serde(default)]
    bond_interfaces: Vec<String>,
    #[serde(default)]
    params: BondParams,
    #[serde(default)]
    vlan_link: Option<String>,
    #[serde(default)]
    vlan_id: Option<u16>,
    #[serde(default, deserialize_with = "one_or_many")]
    address: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    search: Vec<String>,
}

impl RawDevice {
    fn into_interface(self) -> std::result::Result<(Interface, Extra), String> {
        let name = self
            .name
            .ok_or_else(|| format!("{} device is missing a name", self.kind))?;
        let interface = Interface {
            id: self.id.unwrap_or_else(|| name.clone()),
            name,
            mtu: self.mtu,
            mac_address: self.mac_address,
            subnets: self.subnets,
        };
        let extra = Extra {
            bond_interfaces: self.bond_interfaces,
            params: self.params,
            vlan_link: self.vlan_link,
            vlan_id: self.vlan_id,
        };
        Ok((interface, extra))
    }
}

/// Type-specific leftovers after the shared interface fields are taken.
struct Extra {
    bond_interfaces: Vec<String>,
    params: BondParams,
    vlan_link: Option<String>,
    vlan_id: Option<u16>,
}

impl TryFrom<RawDevice> for Device {
    type Error = String;

    fn try_from(raw: RawDevice) -> std::result::Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "physical" => Ok(Device::Physical(raw.into_interface()?.0)),
            "bond" => {
                let (interface, extra) = raw.into_interface()?;
                Ok(Device::Bond(Bond {
                    interface,
                    members: extra.bond_interfaces,
                    params: extra.params,
                }))
            }
            "vlan" => {
                let (interface, extra) = raw.into_interface()?;
                let link = extra
                    .vlan_link
                    .ok_or_else(|| format!("vlan {} is missing vlan_link", interface.name))?;
                let vlan_id = extra
                    .vlan_id
                    .ok_or_else(|| format!("vlan {} is missing vlan_id", interface.name))?;
                Ok(Device::Vlan(Vlan {
                    interface,
                    link,
                    vlan_id,
                }))
            }
            "nameserver" => Ok(Device::Nameserver(Nameservers {
                addresses: raw.address,
                search: raw.search,
            })),
            _ => Ok(Device::Unknown {
                kind: raw.kind,
                name: raw.name,
            }),
        }
    }
}

/// Accept either a single string or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
