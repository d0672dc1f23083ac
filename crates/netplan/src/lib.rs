//! # netplan
//!
//! Model and loader for version-1 network configuration documents, the
//! device-list format cloud-init and bare-metal provisioners hand to a host.
//!
//! ## Example
//!
//! ```no_run
//! use netplan::Device;
//! use std::path::Path;
//!
//! let config = netplan::load(Path::new("network.yaml")).expect("invalid document");
//! for device in &config.config {
//!     match device {
//!         Device::Physical(iface) => println!("nic {} ({:?})", iface.name, iface.mac_address),
//!         Device::Bond(bond) => println!("bond {} over {:?}", bond.interface.name, bond.members),
//!         Device::Vlan(vlan) => println!("vlan {} on {}", vlan.vlan_id, vlan.link),
//!         Device::Nameserver(ns) => println!("dns {:?}", ns.addresses),
//!         Device::Unknown { kind, .. } => println!("unsupported {kind}"),
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod cidr;
mod document;
pub mod error;
#[allow(missing_docs)]
pub mod types;

pub use cidr::Cidr;
pub use document::{SUPPORTED_VERSION, load, parse_str};
pub use error::{Error, Result};
pub use types::{
    Bond, BondMode, BondParams, Device, Interface, Nameservers, NetworkConfig, Route, Subnet,
    SubnetKind, Vlan,
};
