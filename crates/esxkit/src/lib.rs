//! # esxkit
//!
//! Typed client for ESXi host networking via `esxcli`.
//!
//! This crate provides:
//! - Inspection of adapters, VMkernel interfaces, vSwitches, DNS and routes
//! - Creation/removal of vSwitches, uplinks, port groups and VMkernel interfaces
//! - IPv4/IPv6 interface configuration and static routes
//!
//! Every call blocks until esxcli exits. A non-zero exit is returned as
//! [`Error::CommandFailed`]; nothing is retried.
//!
//! ## Example
//!
//! ```no_run
//! use esxkit::Esxcli;
//!
//! let host = Esxcli::new("esxcli");
//! for nic in host.list_nics().expect("esxcli not available") {
//!     println!("{} {}", nic.name, nic.mac_address);
//! }
//! host.add_vswitch("vSwitch1").expect("failed to add vswitch");
//! ```
//!
//! ## Dry runs
//!
//! [`Esxcli::dry_run`] turns every mutating call into a logged no-op while
//! inspection commands still run, so a plan can be previewed against the
//! live host.

#![warn(missing_docs)]

pub mod error;
pub mod mock;
pub mod parse;
pub mod runner;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use runner::{CommandOutput, ProcessRunner, Runner};
pub use types::{FailoverPolicy, IpFamily, LoadBalancing, Nic, VmknicSpec};

/// Client for esxcli network operations.
pub struct Esxcli {
    runner: Box<dyn Runner>,
    program: String,
    dry_run: bool,
}

impl Esxcli {
    /// Create a client that runs `program` (usually `esxcli`) as a process.
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, Box::new(ProcessRunner))
    }

    /// Create a client with a custom runner (useful for testing).
    pub fn with_runner(program: impl Into<String>, runner: Box<dyn Runner>) -> Self {
        Self {
            runner,
            program: program.into(),
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Whether mutating calls are being suppressed.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn argv(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.program.as_str())
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    /// Run a command and return stdout, failing on non-zero exit.
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let argv = self.argv(args);
        let output = self.runner.run(&argv)?;
        if !output.success() {
            return Err(Error::CommandFailed {
                command: argv.join(" "),
                code: output.code,
                stderr: output.stderr_str().trim().to_string(),
            });
        }
        Ok(output.stdout_str())
    }

    /// Run an inspection command.
    fn query(&self, args: &[&str]) -> Result<String> {
        log::debug!("{} {}", self.program, args.join(" "));
        self.run_checked(args)
    }

    /// Run a command that changes host state (suppressed in dry-run mode).
    fn mutate(&self, args: &[&str]) -> Result<()> {
        if self.dry_run {
            log::info!("[dry-run] {} {}", self.program, args.join(" "));
            return Ok(());
        }
        log::info!("{} {}", self.program, args.join(" "));
        self.run_checked(args)?;
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// List physical adapters with their hardware addresses.
    pub fn list_nics(&self) -> Result<Vec<Nic>> {
        let output = self.query(&["network", "nic", "list"])?;
        Ok(parse::parse_nics(&output))
    }

    /// List VMkernel interface names.
    pub fn list_vmknics(&self) -> Result<Vec<String>> {
        let output = self.query(&["network", "ip", "interface", "list"])?;
        Ok(parse::parse_names(&output))
    }

    /// List standard vSwitch names.
    pub fn list_vswitches(&self) -> Result<Vec<String>> {
        let output = self.query(&["network", "vswitch", "standard", "list"])?;
        Ok(parse::parse_names(&output))
    }

    /// List configured DNS servers.
    pub fn list_dns_servers(&self) -> Result<Vec<String>> {
        let output = self.query(&["network", "ip", "dns", "server", "list"])?;
        Ok(parse::parse_list_field(&output, "DNSServers"))
    }

    /// List configured DNS search domains.
    pub fn list_dns_search(&self) -> Result<Vec<String>> {
        let output = self.query(&["network", "ip", "dns", "search", "list"])?;
        Ok(parse::parse_list_field(&output, "DNSSearch Domains"))
    }

    /// Raw route table for an address family.
    pub fn route_table(&self, family: IpFamily) -> Result<String> {
        self.query(&["network", "ip", "route", family.as_str(), "list"])
    }

    /// Whether the route table already has `network`/`netmask` via `gateway`.
    pub fn route_exists(
        &self,
        family: IpFamily,
        network: &str,
        netmask: &str,
        gateway: &str,
    ) -> Result<bool> {
        let table = self.route_table(family)?;
        Ok(parse::route_table_contains(&table, network, netmask, gateway))
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove a VMkernel interface.
    pub fn remove_vmknic(&self, name: &str) -> Result<()> {
        let name = format!("--interface-name={name}");
        self.mutate(&["network", "ip", "interface", "remove", &name])
    }

    /// Remove a standard vSwitch (and its port groups).
    pub fn remove_vswitch(&self, name: &str) -> Result<()> {
        let name = format!("--vswitch-name={name}");
        self.mutate(&["network", "vswitch", "standard", "remove", &name])
    }

    /// Remove every configured DNS server.
    pub fn clear_dns_servers(&self) -> Result<()> {
        self.mutate(&["network", "ip", "dns", "server", "remove", "--all"])
    }

    /// Remove one DNS search domain (esxcli has no bulk removal for these).
    pub fn remove_dns_search(&self, domain: &str) -> Result<()> {
        let domain = format!("--domain={domain}");
        self.mutate(&["network", "ip", "dns", "search", "remove", &domain])
    }

    // =========================================================================
    // vSwitches and port groups
    // =========================================================================

    /// Create a standard vSwitch.
    pub fn add_vswitch(&self, name: &str) -> Result<()> {
        let name = format!("--vswitch-name={name}");
        self.mutate(&["network", "vswitch", "standard", "add", &name])
    }

    /// Set a vSwitch's MTU.
    pub fn set_vswitch_mtu(&self, name: &str, mtu: u32) -> Result<()> {
        let name = format!("--vswitch-name={name}");
        let mtu = format!("--mtu={mtu}");
        self.mutate(&["network", "vswitch", "standard", "set", &name, &mtu])
    }

    /// Attach a physical adapter to a vSwitch as an uplink.
    pub fn add_uplink(&self, vswitch: &str, uplink: &str) -> Result<()> {
        let uplink = format!("--uplink-name={uplink}");
        let vswitch = format!("--vswitch-name={vswitch}");
        self.mutate(&[
            "network", "vswitch", "standard", "uplink", "add", &uplink, &vswitch,
        ])
    }

    /// Set the failover/load-balancing policy of a vSwitch.
    pub fn set_failover_policy(&self, vswitch: &str, policy: &FailoverPolicy) -> Result<()> {
        let vswitch = format!("--vswitch-name={vswitch}");
        let load_balancing = format!("--load-balancing={}", policy.load_balancing);
        let active = format!("--active-uplinks={}", policy.active.join(","));
        let standby = format!("--standby-uplinks={}", policy.standby.join(","));

        let mut args = vec![
            "network",
            "vswitch",
            "standard",
            "policy",
            "failover",
            "set",
            vswitch.as_str(),
            load_balancing.as_str(),
        ];
        if !policy.active.is_empty() {
            args.push(&active);
        }
        if !policy.standby.is_empty() {
            args.push(&standby);
        }
        self.mutate(&args)
    }

    /// Add a port group to a vSwitch.
    pub fn add_portgroup(&self, vswitch: &str, portgroup: &str) -> Result<()> {
        let portgroup = format!("--portgroup-name={portgroup}");
        let vswitch = format!("--vswitch-name={vswitch}");
        self.mutate(&[
            "network", "vswitch", "standard", "portgroup", "add", &portgroup, &vswitch,
        ])
    }

    /// Tag a port group with a VLAN id.
    pub fn set_portgroup_vlan(&self, portgroup: &str, vlan_id: u16) -> Result<()> {
        let portgroup = format!("--portgroup-name={portgroup}");
        let vlan = format!("--vlan-id={vlan_id}");
        self.mutate(&[
            "network", "vswitch", "standard", "portgroup", "set", &portgroup, &vlan,
        ])
    }

    // =========================================================================
    // VMkernel interfaces
    // =========================================================================

    /// Create a VMkernel interface on a port group.
    pub fn add_vmknic(&self, spec: &VmknicSpec) -> Result<()> {
        let name = format!("--interface-name={}", spec.name);
        let portgroup = format!("--portgroup-name={}", spec.portgroup);
        let mtu = spec.mtu.map(|m| format!("--mtu={m}"));
        let mac = spec.mac_address.as_ref().map(|m| format!("--mac-address={m}"));

        let mut args = vec![
            "network",
            "ip",
            "interface",
            "add",
            name.as_str(),
            portgroup.as_str(),
        ];
        if let Some(mtu) = &mtu {
            args.push(mtu);
        }
        if let Some(mac) = &mac {
            args.push(mac);
        }
        self.mutate(&args)
    }

    /// Give an interface a static IPv4 address.
    pub fn set_ipv4_static(&self, interface: &str, address: &str, netmask: &str) -> Result<()> {
        let interface = format!("--interface-name={interface}");
        let address = format!("--ipv4={address}");
        let netmask = format!("--netmask={netmask}");
        self.mutate(&[
            "network",
            "ip",
            "interface",
            "ipv4",
            "set",
            &interface,
            "--type=static",
            &address,
            &netmask,
        ])
    }

    /// Switch an interface to DHCPv4, optionally overriding the gateway.
    pub fn set_ipv4_dhcp(&self, interface: &str, gateway: Option<&str>) -> Result<()> {
        let interface = format!("--interface-name={interface}");
        let gateway = gateway.map(|g| format!("--gateway={g}"));

        let mut args = vec![
            "network",
            "ip",
            "interface",
            "ipv4",
            "set",
            interface.as_str(),
            "--type=dhcp",
        ];
        if let Some(gateway) = &gateway {
            args.push(gateway);
        }
        self.mutate(&args)
    }

    /// Add a static IPv6 address (`address/prefix`) to an interface.
    pub fn add_ipv6_address(&self, interface: &str, cidr: &str) -> Result<()> {
        let interface = format!("--interface-name={interface}");
        let address = format!("--ipv6={cidr}");
        self.mutate(&[
            "network", "ip", "interface", "ipv6", "address", "add", &interface, &address,
        ])
    }

    /// Set an interface's IPv6 default gateway.
    pub fn set_ipv6_gateway(&self, interface: &str, gateway: &str) -> Result<()> {
        let interface = format!("--interface-name={interface}");
        let gateway = format!("--gateway={gateway}");
        self.mutate(&[
            "network", "ip", "interface", "ipv6", "set", &interface, &gateway,
        ])
    }

    /// Enable IPv6 with router advertisements and DHCPv6 on an interface.
    pub fn enable_dhcpv6(&self, interface: &str, gateway: Option<&str>) -> Result<()> {
        let interface = format!("--interface-name={interface}");
        let gateway = gateway.map(|g| format!("--gateway={g}"));

        let mut args = vec![
            "network",
            "ip",
            "interface",
            "ipv6",
            "set",
            interface.as_str(),
            "--enable-ipv6=true",
            "--enable-router-adv=true",
            "--enable-dhcpv6=true",
        ];
        if let Some(gateway) = &gateway {
            args.push(gateway);
        }
        self.mutate(&args)
    }

    // =========================================================================
    // Routes and DNS
    // =========================================================================

    /// Add a route. `network` is `default` or `address/prefix`.
    pub fn add_route(&self, family: IpFamily, network: &str, gateway: &str) -> Result<()> {
        let network = format!("--network={network}");
        let gateway = format!("--gateway={gateway}");
        self.mutate(&[
            "network",
            "ip",
            "route",
            family.as_str(),
            "add",
            &network,
            &gateway,
        ])
    }

    /// Add a DNS server.
    pub fn add_dns_server(&self, server: &str) -> Result<()> {
        let server = format!("--server={server}");
        self.mutate(&["network", "ip", "dns", "server", "add", &server])
    }

    /// Add a DNS search domain.
    pub fn add_dns_search(&self, domain: &str) -> Result<()> {
        let domain = format!("--domain={domain}");
        self.mutate(&["network", "ip", "dns", "search", "add", &domain])
    }
}
