//! Parsers for esxcli's human-readable list output.
//!
//! esxcli prints either `Key: value` blocks or whitespace-aligned tables.
//! Only the handful of shapes the client needs are handled here.

use crate::types::Nic;
use regex::Regex;
use std::sync::LazyLock;

static NAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Name:\s*(\S+)\s*$").expect("valid regex"));

static NIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+.*?\b([0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5})\b").expect("valid regex")
});

/// Extract every `Name: <token>` value, in order.
///
/// Used for `ip interface list` and `vswitch standard list`.
pub fn parse_names(output: &str) -> Vec<String> {
    NAME_LINE
        .captures_iter(output)
        .map(|c| c[1].to_string())
        .collect()
}

/// Extract adapters from `network nic list`.
///
/// Header and separator lines carry no hardware address and are skipped.
/// Addresses are lowercased.
pub fn parse_nics(output: &str) -> Vec<Nic> {
    output
        .lines()
        .filter_map(|line| NIC_LINE.captures(line))
        .map(|c| Nic {
            name: c[1].to_string(),
            mac_address: c[2].to_lowercase(),
        })
        .collect()
}

/// Extract a comma-separated `Label: a, b` field.
///
/// Used for `DNSServers:` and `DNSSearch Domains:`. Returns an empty list
/// if the label is missing or its value is empty.
pub fn parse_list_field(output: &str, label: &str) -> Vec<String> {
    let prefix = format!("{label}:");
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix(prefix.as_str()))
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Whether a route table listing contains an entry for this route.
///
/// An entry matches if a single line has the network, netmask and gateway
/// among its whitespace-separated columns.
pub fn route_table_contains(output: &str, network: &str, netmask: &str, gateway: &str) -> bool {
    output.lines().any(|line| {
        let columns: Vec<&str> = line.split_whitespace().collect();
        [network, netmask, gateway]
            .iter()
            .all(|needle| columns.contains(needle))
    })
}
