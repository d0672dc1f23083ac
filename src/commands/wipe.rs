//! `esxnet wipe` - clear host networking without configuring anything.

use anyhow::Result;
use esxkit::Esxcli;

use crate::Context;
use crate::engine;
use crate::ui;

pub fn run(ctx: &Context, host: &Esxcli) -> Result<()> {
    if host.is_dry_run() && !ctx.quiet {
        ui::info("Dry run - changes are logged, not made");
    }

    let summary = engine::wipe(host)?;

    if ctx.quiet {
        return Ok(());
    }
    if summary.total() == 0 {
        ui::success("Nothing to remove");
        return Ok(());
    }
    ui::success(&format!(
        "Removed {} vmknic(s), {} vSwitch(es), {} DNS server(s), {} search domain(s)",
        summary.vmknics, summary.vswitches, summary.dns_servers, summary.search_domains
    ));
    Ok(())
}
