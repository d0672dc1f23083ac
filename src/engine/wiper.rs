//! Returns the host to a known-empty networking baseline.
//!
//! This is the only idempotency mechanism the translator has: everything it
//! builds afterwards assumes nothing exists yet. Any failure aborts the run.

use anyhow::{Context, Result};
use esxkit::Esxcli;

use super::report::WipeSummary;

/// Remove every vmknic, vSwitch, DNS server and search domain.
///
/// Interfaces go first since a vSwitch can't be removed while a vmknic is
/// still bound to one of its port groups.
pub fn wipe(host: &Esxcli) -> Result<WipeSummary> {
    let mut summary = WipeSummary::default();

    for vmknic in host.list_vmknics().context("Failed to list VMkernel interfaces")? {
        host.remove_vmknic(&vmknic)
            .with_context(|| format!("Failed to remove {vmknic}"))?;
        summary.vmknics += 1;
    }

    for vswitch in host.list_vswitches().context("Failed to list vSwitches")? {
        host.remove_vswitch(&vswitch)
            .with_context(|| format!("Failed to remove {vswitch}"))?;
        summary.vswitches += 1;
    }

    let servers = host.list_dns_servers().context("Failed to list DNS servers")?;
    if !servers.is_empty() {
        host.clear_dns_servers().context("Failed to clear DNS servers")?;
        summary.dns_servers = servers.len();
    }

    for domain in host.list_dns_search().context("Failed to list DNS search domains")? {
        host.remove_dns_search(&domain)
            .with_context(|| format!("Failed to remove search domain {domain}"))?;
        summary.search_domains += 1;
    }

    log::info!("wiped {} objects", summary.total());
    Ok(summary)
}
