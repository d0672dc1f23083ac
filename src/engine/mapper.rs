//! Correlation between logical device ids, hardware addresses and the
//! host's physical adapters.

use esxkit::Nic;
use netplan::Device;
use std::collections::{HashMap, HashSet};

/// Lookup tables for one run. Built from the live adapter inventory and the
/// document, then extended as switches are created.
#[derive(Debug, Default)]
pub struct CorrelationTables {
    /// Lowercased hardware address -> adapter name (live)
    adapters_by_mac: HashMap<String, String>,
    /// Physical device id -> lowercased hardware address (document)
    macs_by_device: HashMap<String, String>,
    /// Physical devices without a hardware address whose id is a live adapter
    direct_adapters: HashSet<String>,
    /// Device id -> vSwitch name
    switches: HashMap<String, String>,
}

impl CorrelationTables {
    pub fn build(nics: &[Nic], devices: &[Device]) -> Self {
        let adapters_by_mac: HashMap<String, String> = nics
            .iter()
            .map(|nic| (nic.mac_address.to_lowercase(), nic.name.clone()))
            .collect();
        let live: HashSet<&str> = nics.iter().map(|nic| nic.name.as_str()).collect();

        let mut macs_by_device = HashMap::new();
        let mut direct_adapters = HashSet::new();
        for device in devices {
            let Device::Physical(iface) = device else {
                continue;
            };
            match &iface.mac_address {
                Some(mac) => {
                    if macs_by_device.contains_key(&iface.id) {
                        log::debug!("duplicate physical device id {}, keeping first", iface.id);
                        continue;
                    }
                    macs_by_device.insert(iface.id.clone(), mac.to_lowercase());
                }
                None if live.contains(iface.id.as_str()) => {
                    direct_adapters.insert(iface.id.clone());
                }
                None => {}
            }
        }

        Self {
            adapters_by_mac,
            macs_by_device,
            direct_adapters,
            switches: HashMap::new(),
        }
    }

    /// Physical adapter backing a device id, if one can be found.
    pub fn resolve_adapter(&self, device_id: &str) -> Option<String> {
        if let Some(mac) = self.macs_by_device.get(device_id) {
            return self.adapters_by_mac.get(mac).cloned();
        }
        self.direct_adapters
            .contains(device_id)
            .then(|| device_id.to_string())
    }

    /// Adapter with this hardware address (case-insensitive).
    pub fn adapter_for_mac(&self, mac: &str) -> Option<&str> {
        self.adapters_by_mac
            .get(&mac.to_lowercase())
            .map(String::as_str)
    }

    /// vSwitch created for (or reused by) a device.
    pub fn switch_for(&self, device_id: &str) -> Option<&str> {
        self.switches.get(device_id).map(String::as_str)
    }

    pub fn record_switch(&mut self, device_id: &str, vswitch: &str) {
        self.switches
            .insert(device_id.to_string(), vswitch.to_string());
    }
}
