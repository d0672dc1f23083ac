use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use esxkit::Esxcli;
use netplan::{Interface, NetworkConfig};

use crate::Context;
use crate::engine::CorrelationTables;
use crate::ui;

pub fn run(ctx: &Context, host: &Esxcli, config: &NetworkConfig) -> Result<()> {
    ui::header("Host Network Status");

    let nics = host.list_nics().context("Failed to list physical adapters")?;
    ui::section("Physical adapters");
    if nics.is_empty() {
        ui::dim("none");
    }
    for nic in &nics {
        ui::kv(&nic.name, &nic.mac_address);
    }

    ui::section("Virtual networking");
    ui::kv("vSwitches", &ui::list_or_dash(&host.list_vswitches()?));
    ui::kv("VMkernel interfaces", &ui::list_or_dash(&host.list_vmknics()?));

    ui::section("DNS");
    ui::kv("Servers", &ui::list_or_dash(&host.list_dns_servers()?));
    ui::kv("Search domains", &ui::list_or_dash(&host.list_dns_search()?));

    ui::section("Document devices");
    let tables = CorrelationTables::build(&nics, &config.config);
    let mut any = false;
    for iface in config.physical() {
        any = true;
        let adapter = match tables.resolve_adapter(&iface.id) {
            Some(adapter) => adapter.green().to_string(),
            None => "unresolved".yellow().to_string(),
        };
        if ctx.verbose > 0 {
            ui::kv(&iface.id, &format!("{adapter} {}", match_key(iface).dimmed()));
        } else {
            ui::kv(&iface.id, &adapter);
        }
    }
    if !any {
        ui::dim("no physical devices");
    }

    println!();
    Ok(())
}

/// What a physical device is matched on: its hardware address, or its id
/// taken as a live adapter name.
fn match_key(iface: &Interface) -> String {
    match &iface.mac_address {
        Some(mac) => format!("(mac {})", mac.to_lowercase()),
        None => format!("(name {})", iface.id),
    }
}
