//! Per-device translation into esxcli operations.
//!
//! Devices are handled strictly in document order. Each handler either
//! finishes its device, skips it, or gives up on it with a warning; only a
//! failing esxcli call aborts the whole run.

use anyhow::{Context, Result};
use esxkit::Esxcli;
use netplan::{Bond, BondMode, Device, Interface, Nameservers, Vlan};

use super::bond::{failover_policy, policy_for, uplink_order};
use super::context::RunContext;
use super::report::{DeviceOutcome, DeviceReport, ProgressCallback, Summary, TranslationReport};
use super::subnet::{SubnetTarget, apply_subnets};

/// Id used in reports for devices that have none of their own.
const NAMESERVER_ID: &str = "nameservers";

/// Translate every device in order, collecting outcomes and warnings.
pub fn translate(
    host: &Esxcli,
    ctx: &mut RunContext,
    devices: &[Device],
    progress: &mut dyn ProgressCallback,
) -> Result<TranslationReport> {
    let mut reports = Vec::with_capacity(devices.len());
    let mut summary = Summary::default();

    for (index, device) in devices.iter().enumerate() {
        let kind = device.kind().to_string();
        let id = device
            .id()
            .map_or_else(|| NAMESERVER_ID.to_string(), String::from);
        progress.on_device_start(index, devices.len(), &id, &kind);

        let first_warning = ctx.warnings.len();
        let outcome = translate_device(host, ctx, device)
            .with_context(|| format!("Failed to configure {kind} {id}"))?;

        summary.add(&outcome);
        let report = DeviceReport { id, kind, outcome };
        progress.on_device_complete(&report, &ctx.warnings[first_warning..]);
        reports.push(report);
    }

    Ok(TranslationReport {
        devices: reports,
        warnings: ctx.warnings.clone(),
        summary,
    })
}

fn translate_device(host: &Esxcli, ctx: &mut RunContext, device: &Device) -> Result<DeviceOutcome> {
    match device {
        Device::Physical(iface) => physical(host, ctx, iface),
        Device::Bond(bond) => self::bond(host, ctx, bond),
        Device::Vlan(vlan) => self::vlan(host, ctx, vlan),
        Device::Nameserver(ns) => nameserver(host, ns),
        Device::Unknown { kind, name } => {
            ctx.warn(name.as_deref(), format!("unsupported device type {kind}"));
            Ok(DeviceOutcome::skipped(format!("unsupported device type {kind}")))
        }
    }
}

/// Allocate and create a vSwitch, applying the MTU if there is one.
fn create_switch(host: &Esxcli, ctx: &mut RunContext, mtu: Option<u32>) -> Result<String> {
    let vswitch = ctx.names.next_vswitch();
    host.add_vswitch(&vswitch)?;
    if let Some(mtu) = mtu {
        host.set_vswitch_mtu(&vswitch, mtu)?;
    }
    Ok(vswitch)
}

fn target<'a>(iface: &'a Interface, vswitch: &'a str, vlan_id: Option<u16>) -> SubnetTarget<'a> {
    SubnetTarget {
        device_id: &iface.id,
        name: &iface.name,
        vswitch,
        vlan_id,
        mtu: iface.mtu,
        mac_address: iface.mac_address.as_deref(),
    }
}

fn physical(host: &Esxcli, ctx: &mut RunContext, iface: &Interface) -> Result<DeviceOutcome> {
    // Address-less NICs exist only to be referenced by bonds and VLANs
    if !iface.has_addressing() {
        return Ok(DeviceOutcome::skipped("no addressable subnets"));
    }

    let vswitch = create_switch(host, ctx, iface.mtu)?;
    ctx.tables.record_switch(&iface.id, &vswitch);

    let Some(adapter) = ctx.tables.resolve_adapter(&iface.id) else {
        let reason = format!("no physical adapter matches {}", iface.id);
        ctx.warn(Some(iface.id.as_str()), &reason);
        return Ok(DeviceOutcome::failed(reason));
    };
    host.add_uplink(&vswitch, &adapter)?;

    apply_subnets(host, ctx, &target(iface, &vswitch, None), &iface.subnets)?;
    Ok(DeviceOutcome::Configured)
}

fn bond(host: &Esxcli, ctx: &mut RunContext, bond: &Bond) -> Result<DeviceOutcome> {
    let id = bond.interface.id.as_str();

    let Some(policy) = policy_for(bond) else {
        let reason = format!("unsupported bond mode {}", bond.params.bond_mode());
        ctx.warn(Some(id), &reason);
        return Ok(DeviceOutcome::failed(reason));
    };

    let uplinks = match uplink_order(&ctx.tables, bond) {
        Ok(uplinks) => uplinks,
        Err(reason) => {
            ctx.warn(Some(id), &reason);
            return Ok(DeviceOutcome::failed(reason));
        }
    };

    let mut notes = Vec::new();
    if bond.params.bond_mode() == BondMode::Lacp {
        notes.push(format!(
            "802.3ad has no LACP equivalent on a standard vSwitch, using {}",
            policy.load_balancing
        ));
    }
    if !policy.dropped.is_empty() {
        notes.push(format!("ignoring {}", policy.dropped.join(", ")));
    }
    if !notes.is_empty() {
        ctx.warn(Some(id), notes.join("; "));
    }

    let vswitch = create_switch(host, ctx, bond.interface.mtu)?;
    ctx.tables.record_switch(id, &vswitch);
    for uplink in &uplinks {
        host.add_uplink(&vswitch, uplink)?;
    }
    host.set_failover_policy(&vswitch, &failover_policy(policy.load_balancing, &uplinks))?;

    apply_subnets(
        host,
        ctx,
        &target(&bond.interface, &vswitch, None),
        &bond.interface.subnets,
    )?;
    Ok(DeviceOutcome::Configured)
}

fn vlan(host: &Esxcli, ctx: &mut RunContext, vlan: &Vlan) -> Result<DeviceOutcome> {
    let vswitch = if let Some(existing) = ctx.tables.switch_for(&vlan.link) {
        existing.to_string()
    } else {
        // Parent hasn't been given a switch yet; build one on its adapter
        let Some(adapter) = ctx.tables.resolve_adapter(&vlan.link) else {
            let reason = format!("parent {} has no physical adapter", vlan.link);
            ctx.warn(Some(vlan.interface.id.as_str()), &reason);
            return Ok(DeviceOutcome::failed(reason));
        };
        let vswitch = create_switch(host, ctx, vlan.interface.mtu)?;
        host.add_uplink(&vswitch, &adapter)?;
        ctx.tables.record_switch(&vlan.link, &vswitch);
        vswitch
    };

    apply_subnets(
        host,
        ctx,
        &target(&vlan.interface, &vswitch, Some(vlan.vlan_id)),
        &vlan.interface.subnets,
    )?;
    Ok(DeviceOutcome::Configured)
}

fn nameserver(host: &Esxcli, ns: &Nameservers) -> Result<DeviceOutcome> {
    if ns.addresses.is_empty() && ns.search.is_empty() {
        return Ok(DeviceOutcome::skipped("no servers or search domains"));
    }
    for server in &ns.addresses {
        host.add_dns_server(server)?;
    }
    for domain in &ns.search {
        host.add_dns_search(domain)?;
    }
    Ok(DeviceOutcome::Configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mapper::CorrelationTables;
    use crate::engine::report::NoProgress;
    use esxkit::Nic;
    use esxkit::mock::MockRunner;
    use pretty_assertions::assert_eq;

    fn nics() -> Vec<Nic> {
        (0..3)
            .map(|i| Nic {
                name: format!("vmnic{i}"),
                mac_address: format!("00:50:56:aa:bb:0{}", i + 1),
            })
            .collect()
    }

    fn run(yaml: &str) -> (TranslationReport, MockRunner) {
        let mock = MockRunner::new();
        let host = Esxcli::with_runner("esxcli", Box::new(mock.clone()));
        let config = netplan::parse_str(yaml).unwrap();
        let mut ctx = RunContext::new(CorrelationTables::build(&nics(), &config.config));
        let report = translate(&host, &mut ctx, &config.config, &mut NoProgress).unwrap();
        (report, mock)
    }

    fn switch_adds(mock: &MockRunner) -> Vec<String> {
        mock.commands_matching("network vswitch standard add")
    }

    #[test]
    fn test_physical_static() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: physical
    name: eth0
    mac_address: "00:50:56:aa:bb:01"
    mtu: 9000
    subnets:
      - type: static
        address: 10.0.0.5/24
        gateway: 10.0.0.1
"#,
        );

        assert_eq!(
            mock.mutations(),
            vec![
                "network vswitch standard add --vswitch-name=vSwitch0",
                "network vswitch standard set --vswitch-name=vSwitch0 --mtu=9000",
                "network vswitch standard uplink add --uplink-name=vmnic0 --vswitch-name=vSwitch0",
                "network vswitch standard portgroup add --portgroup-name=eth0 --vswitch-name=vSwitch0",
                "network ip interface add --interface-name=vmk0 --portgroup-name=eth0 \
                 --mtu=9000 --mac-address=00:50:56:aa:bb:01",
                "network ip interface ipv4 set --interface-name=vmk0 --type=static \
                 --ipv4=10.0.0.5 --netmask=255.255.255.0",
                "network ip route ipv4 add --network=default --gateway=10.0.0.1",
            ]
        );
        assert_eq!(report.outcome("eth0"), Some(&DeviceOutcome::Configured));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_physical_without_subnets_is_skipped() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: physical
    name: eth0
    mac_address: "00:50:56:aa:bb:01"
    subnets: [{type: manual}]
"#,
        );

        assert!(mock.mutations().is_empty());
        assert!(matches!(report.outcome("eth0"), Some(DeviceOutcome::Skipped { .. })));
        assert_eq!(report.summary.skipped, 1);
    }

    #[test]
    fn test_physical_unresolved_keeps_switch() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: physical
    name: eth9
    mac_address: "de:ad:be:ef:00:00"
    subnets: [{type: dhcp4}]
"#,
        );

        assert_eq!(
            mock.mutations(),
            vec!["network vswitch standard add --vswitch-name=vSwitch0"]
        );
        assert!(matches!(report.outcome("eth9"), Some(DeviceOutcome::Failed { .. })));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].device.as_deref(), Some("eth9"));
    }

    const BOND_DOC: &str = r#"
version: 1
config:
  - type: physical
    name: eth0
    mac_address: "00:50:56:aa:bb:01"
  - type: physical
    name: eth1
    mac_address: "00:50:56:aa:bb:02"
  - type: bond
    name: bond0
    mac_address: "00:50:56:aa:bb:02"
    bond_interfaces: [eth0, eth1]
    params:
      bond-mode: MODE
    subnets: [{type: dhcp4}]
"#;

    fn run_bond(mode: &str) -> (TranslationReport, MockRunner) {
        run(&BOND_DOC.replace("MODE", mode))
    }

    #[test]
    fn test_bond_active_backup() {
        let (report, mock) = run_bond("active-backup");

        assert_eq!(
            mock.mutations()[..4].to_vec(),
            vec![
                "network vswitch standard add --vswitch-name=vSwitch0",
                "network vswitch standard uplink add --uplink-name=vmnic1 --vswitch-name=vSwitch0",
                "network vswitch standard uplink add --uplink-name=vmnic0 --vswitch-name=vSwitch0",
                "network vswitch standard policy failover set --vswitch-name=vSwitch0 \
                 --load-balancing=explicit --active-uplinks=vmnic1 --standby-uplinks=vmnic0",
            ]
        );
        assert_eq!(report.outcome("bond0"), Some(&DeviceOutcome::Configured));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_bond_balance_rr_uses_portid() {
        let (_, mock) = run_bond("balance-rr");
        let policy = mock.commands_matching("network vswitch standard policy failover set");
        assert_eq!(policy.len(), 1);
        assert!(policy[0].contains("--load-balancing=portid"));
        assert!(policy[0].contains("--active-uplinks=vmnic1,vmnic0"));
    }

    #[test]
    fn test_bond_lacp_uses_iphash_with_warning() {
        let (report, mock) = run_bond("802.3ad");
        let policy = mock.commands_matching("network vswitch standard policy failover set");
        assert!(policy[0].contains("--load-balancing=iphash"));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.outcome("bond0"), Some(&DeviceOutcome::Configured));
    }

    #[test]
    fn test_bond_miimon_is_reported_as_ignored() {
        let (report, mock) = run_bond("active-backup\n      bond-miimon: 100");

        assert_eq!(switch_adds(&mock).len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].message, "ignoring bond-miimon");
        assert_eq!(report.outcome("bond0"), Some(&DeviceOutcome::Configured));
    }

    #[test]
    fn test_bond_unsupported_mode() {
        let (report, mock) = run_bond("balance-xor");

        assert!(switch_adds(&mock).is_empty());
        assert!(mock.commands_matching("network vswitch standard uplink").is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("balance-xor"));
        assert!(matches!(report.outcome("bond0"), Some(DeviceOutcome::Failed { .. })));
    }

    #[test]
    fn test_bond_unresolved_member_creates_nothing() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: bond
    name: bond0
    bond_interfaces: [eth0, eth7]
"#,
        );
        assert!(mock.mutations().is_empty());
        assert_eq!(report.summary.failed, 1);
    }

    #[test]
    fn test_vlan_reuses_bond_switch() {
        let (_, mock) = run(
            r#"
version: 1
config:
  - type: physical
    name: eth0
    mac_address: "00:50:56:aa:bb:01"
  - type: bond
    name: bond0
    bond_interfaces: [eth0]
    params: {bond-mode: active-backup}
  - type: vlan
    name: bond0.100
    vlan_link: bond0
    vlan_id: 100
    subnets: [{type: dhcp4}]
  - type: vlan
    name: bond0.200
    vlan_link: bond0
    vlan_id: 200
    subnets: [{type: dhcp4}]
"#,
        );

        assert_eq!(switch_adds(&mock).len(), 1);
        assert_eq!(
            mock.commands_matching("network vswitch standard portgroup"),
            vec![
                "network vswitch standard portgroup add --portgroup-name=bond0.100 --vswitch-name=vSwitch0",
                "network vswitch standard portgroup set --portgroup-name=bond0.100 --vlan-id=100",
                "network vswitch standard portgroup add --portgroup-name=bond0.200 --vswitch-name=vSwitch0",
                "network vswitch standard portgroup set --portgroup-name=bond0.200 --vlan-id=200",
            ]
        );
        assert_eq!(
            mock.commands_matching("network ip interface add"),
            vec![
                "network ip interface add --interface-name=vmk0 --portgroup-name=bond0.100",
                "network ip interface add --interface-name=vmk1 --portgroup-name=bond0.200",
            ]
        );
    }

    #[test]
    fn test_vlan_creates_switch_for_bare_parent() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: vlan
    name: eth1.10
    vlan_link: eth1
    vlan_id: 10
    subnets: [{type: dhcp4}]
  - type: physical
    name: eth1
    mac_address: "00:50:56:aa:bb:02"
"#,
        );

        assert_eq!(
            mock.mutations()[..2].to_vec(),
            vec![
                "network vswitch standard add --vswitch-name=vSwitch0",
                "network vswitch standard uplink add --uplink-name=vmnic1 --vswitch-name=vSwitch0",
            ]
        );
        assert_eq!(report.outcome("eth1.10"), Some(&DeviceOutcome::Configured));
    }

    #[test]
    fn test_vlan_unresolved_parent() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: vlan
    name: eth5.10
    vlan_link: eth5
    vlan_id: 10
"#,
        );
        assert!(mock.mutations().is_empty());
        assert!(matches!(report.outcome("eth5.10"), Some(DeviceOutcome::Failed { .. })));
    }

    #[test]
    fn test_nameserver_and_unknown() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: bridge
    name: br0
  - type: nameserver
    address: [10.0.0.2, 10.0.0.3]
    search: [example.com]
"#,
        );

        assert_eq!(
            mock.mutations(),
            vec![
                "network ip dns server add --server=10.0.0.2",
                "network ip dns server add --server=10.0.0.3",
                "network ip dns search add --domain=example.com",
            ]
        );
        assert!(matches!(report.outcome("br0"), Some(DeviceOutcome::Skipped { .. })));
        assert_eq!(report.outcome("nameservers"), Some(&DeviceOutcome::Configured));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_switch_count_matches_devices() {
        let (report, mock) = run(
            r#"
version: 1
config:
  - type: physical
    name: eth0
    mac_address: "00:50:56:aa:bb:01"
    subnets: [{type: dhcp4}]
  - type: physical
    name: eth1
    mac_address: "00:50:56:aa:bb:02"
  - type: physical
    name: eth2
    mac_address: "00:50:56:aa:bb:03"
  - type: bond
    name: bond0
    bond_interfaces: [eth1]
  - type: vlan
    name: eth0.5
    vlan_link: eth0
    vlan_id: 5
  - type: vlan
    name: eth2.6
    vlan_link: eth2
    vlan_id: 6
"#,
        );

        // eth0, bond0, and eth2 for its vlan; eth0.5 reuses eth0's switch
        assert_eq!(
            switch_adds(&mock),
            vec![
                "network vswitch standard add --vswitch-name=vSwitch0",
                "network vswitch standard add --vswitch-name=vSwitch1",
                "network vswitch standard add --vswitch-name=vSwitch2",
            ]
        );
        assert!(report.summary.is_success());
    }

    #[test]
    fn test_command_failure_aborts_run() {
        let mock = MockRunner::new();
        mock.fail("network vswitch standard add", "Sysinfo error: Already exists");
        let host = Esxcli::with_runner("esxcli", Box::new(mock.clone()));
        let config = netplan::parse_str(
            "version: 1\nconfig:\n  - {type: physical, name: vmnic0, subnets: [{type: dhcp4}]}\n",
        )
        .unwrap();
        let mut ctx = RunContext::new(CorrelationTables::build(&nics(), &config.config));

        let err = translate(&host, &mut ctx, &config.config, &mut NoProgress).unwrap_err();
        assert!(err.to_string().contains("vmnic0"));
    }
}
