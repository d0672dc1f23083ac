//! Bond translation: uplink ordering and Linux bonding mode to vSwitch
//! failover policy.

use esxkit::{FailoverPolicy, LoadBalancing};
use netplan::{Bond, BondMode};

use super::mapper::CorrelationTables;

/// A bonding mode the host can express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondPolicy {
    pub load_balancing: LoadBalancing,
    /// Bond parameters that were set but have no vSwitch equivalent
    pub dropped: Vec<&'static str>,
}

/// Map a bonding mode to a load-balancing algorithm.
///
/// Returns `None` for modes with no vSwitch equivalent.
pub fn policy_for(bond: &Bond) -> Option<BondPolicy> {
    let load_balancing = match bond.params.bond_mode() {
        BondMode::BalanceRr => LoadBalancing::PortId,
        BondMode::ActiveBackup => LoadBalancing::Explicit,
        BondMode::Lacp => LoadBalancing::IpHash,
        BondMode::Other(_) => return None,
    };

    let mut dropped = Vec::new();
    if load_balancing == LoadBalancing::IpHash {
        if bond.params.lacp_rate.is_some() {
            dropped.push("bond-lacp-rate");
        }
        if bond.params.xmit_hash_policy.is_some() {
            dropped.push("bond-xmit-hash-policy");
        }
    }
    // Link monitoring is the host's own business on every mode
    if bond.params.miimon.is_some() {
        dropped.push("bond-miimon");
    }
    Some(BondPolicy {
        load_balancing,
        dropped,
    })
}

/// Failover policy for an ordered uplink list.
///
/// Explicit failover keeps the first uplink active and the rest on standby;
/// the hashing algorithms use every uplink actively.
pub fn failover_policy(load_balancing: LoadBalancing, uplinks: &[String]) -> FailoverPolicy {
    let (active, standby) = match load_balancing {
        LoadBalancing::Explicit => {
            let (first, rest) = uplinks.split_at(uplinks.len().min(1));
            (first.to_vec(), rest.to_vec())
        }
        LoadBalancing::PortId | LoadBalancing::IpHash => (uplinks.to_vec(), Vec::new()),
    };
    FailoverPolicy {
        load_balancing,
        active,
        standby,
    }
}

/// Ordered, de-duplicated uplinks for a bond.
///
/// The adapter carrying the bond's own hardware address comes first, then
/// each member's adapter in listed order. Errors with a reason if a member
/// can't be resolved or nothing resolves at all.
pub fn uplink_order(tables: &CorrelationTables, bond: &Bond) -> Result<Vec<String>, String> {
    let mut uplinks: Vec<String> = Vec::new();

    if let Some(primary) = bond
        .interface
        .mac_address
        .as_deref()
        .and_then(|mac| tables.adapter_for_mac(mac))
    {
        uplinks.push(primary.to_string());
    }

    for member in &bond.members {
        let adapter = tables
            .resolve_adapter(member)
            .ok_or_else(|| format!("member {member} has no matching adapter"))?;
        if !uplinks.contains(&adapter) {
            uplinks.push(adapter);
        }
    }

    if uplinks.is_empty() {
        return Err("no uplinks resolved".to_string());
    }
    Ok(uplinks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esxkit::Nic;
    use netplan::Device;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
version: 1
config:
  - type: physical
    name: eth0
    mac_address: "00:50:56:aa:bb:01"
  - type: physical
    name: eth1
    mac_address: "00:50:56:aa:bb:02"
  - type: physical
    name: eth2
    mac_address: "de:ad:be:ef:00:00"
"#;

    fn tables() -> CorrelationTables {
        let nics = vec![
            Nic {
                name: "vmnic0".into(),
                mac_address: "00:50:56:aa:bb:01".into(),
            },
            Nic {
                name: "vmnic1".into(),
                mac_address: "00:50:56:aa:bb:02".into(),
            },
        ];
        CorrelationTables::build(&nics, &netplan::parse_str(DOC).unwrap().config)
    }

    fn bond(yaml: &str) -> Bond {
        match serde_yaml::from_str::<Device>(yaml).unwrap() {
            Device::Bond(bond) => bond,
            other => panic!("expected bond, got {other:?}"),
        }
    }

    #[test]
    fn test_mode_mapping() {
        let lb = |mode: &str| {
            policy_for(&bond(&format!("type: bond\nname: bond0\nparams: {{bond-mode: {mode}}}\n")))
                .map(|p| p.load_balancing)
        };
        assert_eq!(lb("balance-rr"), Some(LoadBalancing::PortId));
        assert_eq!(lb("active-backup"), Some(LoadBalancing::Explicit));
        assert_eq!(lb("802.3ad"), Some(LoadBalancing::IpHash));
        assert_eq!(lb("balance-xor"), None);
    }

    #[test]
    fn test_lacp_reports_dropped_params() {
        let policy = policy_for(&bond(
            "type: bond\nname: bond0\nparams:\n  bond-mode: 802.3ad\n  \
             bond-lacp-rate: fast\n  bond-xmit-hash-policy: layer3+4\n",
        ))
        .unwrap();
        assert_eq!(policy.dropped, vec!["bond-lacp-rate", "bond-xmit-hash-policy"]);
    }

    #[test]
    fn test_miimon_dropped_for_any_mode() {
        let policy = policy_for(&bond(
            "type: bond\nname: bond0\nparams: {bond-mode: active-backup, bond-miimon: 100}\n",
        ))
        .unwrap();
        assert_eq!(policy.dropped, vec!["bond-miimon"]);

        let policy = policy_for(&bond(
            "type: bond\nname: bond0\nparams: {bond-mode: 802.3ad, bond-lacp-rate: slow, bond-miimon: 100}\n",
        ))
        .unwrap();
        assert_eq!(policy.dropped, vec!["bond-lacp-rate", "bond-miimon"]);
    }

    #[test]
    fn test_explicit_failover_split() {
        let uplinks = vec!["vmnic1".to_string(), "vmnic0".to_string()];
        let policy = failover_policy(LoadBalancing::Explicit, &uplinks);
        assert_eq!(policy.active, vec!["vmnic1"]);
        assert_eq!(policy.standby, vec!["vmnic0"]);

        let policy = failover_policy(LoadBalancing::PortId, &uplinks);
        assert_eq!(policy.active, uplinks);
        assert!(policy.standby.is_empty());
    }

    #[test]
    fn test_own_mac_first_then_members_deduplicated() {
        let bond = bond(
            "type: bond\nname: bond0\nmac_address: \"00:50:56:AA:BB:02\"\n\
             bond_interfaces: [eth0, eth1]\n",
        );
        assert_eq!(uplink_order(&tables(), &bond).unwrap(), vec!["vmnic1", "vmnic0"]);
    }

    #[test]
    fn test_unresolved_member_fails() {
        let bond = bond("type: bond\nname: bond0\nbond_interfaces: [eth0, eth2]\n");
        let reason = uplink_order(&tables(), &bond).unwrap_err();
        assert!(reason.contains("eth2"));
    }

    #[test]
    fn test_empty_ordering_fails() {
        let bond = bond("type: bond\nname: bond0\n");
        assert!(uplink_order(&tables(), &bond).is_err());
    }
}
