//! Port groups, VMkernel interfaces, addressing and static routes for a
//! device's subnets. Shared by the physical, bond and VLAN handlers.

use anyhow::Result;
use esxkit::{Esxcli, IpFamily, VmknicSpec};
use netplan::{Route, Subnet, SubnetKind};
use std::net::IpAddr;

use super::context::RunContext;

/// Where a device's subnets land.
#[derive(Debug, Clone, Copy)]
pub struct SubnetTarget<'a> {
    /// Logical device id, for warnings
    pub device_id: &'a str,
    /// Display name; the first port group is named after it
    pub name: &'a str,
    pub vswitch: &'a str,
    pub vlan_id: Option<u16>,
    pub mtu: Option<u32>,
    pub mac_address: Option<&'a str>,
}

impl SubnetTarget<'_> {
    fn portgroup(&self, index: usize) -> String {
        if index == 0 {
            self.name.to_string()
        } else {
            format!("{}:{index}", self.name)
        }
    }
}

/// Apply every non-manual subnet, in order. No-op if there are none.
pub fn apply_subnets(
    host: &Esxcli,
    ctx: &mut RunContext,
    target: &SubnetTarget<'_>,
    subnets: &[Subnet],
) -> Result<()> {
    let addressable = subnets
        .iter()
        .filter(|s| !matches!(s.kind, SubnetKind::Manual));

    for (index, subnet) in addressable.enumerate() {
        let portgroup = target.portgroup(index);
        host.add_portgroup(target.vswitch, &portgroup)?;
        if let Some(vlan_id) = target.vlan_id {
            host.set_portgroup_vlan(&portgroup, vlan_id)?;
        }

        let vmknic = ctx.names.next_vmknic();
        host.add_vmknic(&VmknicSpec {
            name: vmknic.clone(),
            portgroup,
            mtu: target.mtu,
            mac_address: target.mac_address.map(String::from),
        })?;

        if !configure_interface(host, ctx, target.device_id, &vmknic, subnet)? {
            continue;
        }

        for route in &subnet.routes {
            apply_route(host, ctx, target.device_id, route)?;
        }
    }
    Ok(())
}

/// Configure addressing on a fresh vmknic.
///
/// Returns `false` if the subnet was skipped with a warning.
fn configure_interface(
    host: &Esxcli,
    ctx: &mut RunContext,
    device_id: &str,
    vmknic: &str,
    subnet: &Subnet,
) -> Result<bool> {
    let gateway = subnet.gateway.as_deref();
    match &subnet.kind {
        SubnetKind::Static => {
            let cidr = match subnet.cidr() {
                Some(Ok(cidr)) => cidr,
                Some(Err(e)) => {
                    ctx.warn(Some(device_id), format!("skipping static subnet: {e}"));
                    return Ok(false);
                }
                None => {
                    ctx.warn(Some(device_id), "skipping static subnet without an address");
                    return Ok(false);
                }
            };

            let family = IpFamily::of(&cidr.address);
            match family {
                IpFamily::V4 => {
                    host.set_ipv4_static(vmknic, &cidr.address.to_string(), &cidr.netmask())?;
                }
                IpFamily::V6 => host.add_ipv6_address(vmknic, &cidr.to_string())?,
            }

            if let Some(gateway) = gateway {
                match gateway.parse::<IpAddr>() {
                    Ok(gw) if IpFamily::of(&gw) == family => {
                        if family == IpFamily::V6 {
                            host.set_ipv6_gateway(vmknic, gateway)?;
                        }
                        host.add_route(family, "default", gateway)?;
                    }
                    Ok(_) => ctx.warn(
                        Some(device_id),
                        format!("gateway {gateway} is not {family} like {cidr}, not adding it"),
                    ),
                    Err(_) => ctx.warn(
                        Some(device_id),
                        format!("unrecognized gateway address {gateway}"),
                    ),
                }
            }
        }
        SubnetKind::Dhcp4 => host.set_ipv4_dhcp(vmknic, gateway)?,
        SubnetKind::Dhcp6 => host.enable_dhcpv6(vmknic, gateway)?,
        SubnetKind::Manual => return Ok(false),
        SubnetKind::Other(kind) => {
            ctx.warn(Some(device_id), format!("unsupported subnet type {kind}"));
            return Ok(false);
        }
    }
    Ok(true)
}

/// Add a static route unless the live route table already has it.
pub fn apply_route(
    host: &Esxcli,
    ctx: &mut RunContext,
    device_id: &str,
    route: &Route,
) -> Result<()> {
    let (Some(destination), Some(gateway)) = (route.destination(), route.gateway.as_deref())
    else {
        ctx.warn(Some(device_id), "skipping route without a network and gateway");
        return Ok(());
    };

    let destination = match destination {
        Ok(cidr) => cidr,
        Err(e) => {
            ctx.warn(Some(device_id), format!("skipping route: {e}"));
            return Ok(());
        }
    };
    let Ok(gw) = gateway.parse::<IpAddr>() else {
        ctx.warn(
            Some(device_id),
            format!("skipping route to {destination}: unrecognized gateway {gateway}"),
        );
        return Ok(());
    };

    let family = IpFamily::of(&destination.address);
    if IpFamily::of(&gw) != family {
        ctx.warn(
            Some(device_id),
            format!("skipping route to {destination}: gateway {gateway} is not {family}"),
        );
        return Ok(());
    }

    let network = destination.network().to_string();
    if host.route_exists(family, &network, &destination.netmask(), gateway)? {
        log::info!("route {network}/{} via {gateway} already present", destination.prefix_len);
        return Ok(());
    }
    host.add_route(
        family,
        &format!("{network}/{}", destination.prefix_len),
        gateway,
    )?;
    Ok(())
}
