//! `esxnet apply` - wipe, then converge the host to the document.

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use esxkit::Esxcli;
use netplan::NetworkConfig;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::{self, ConvergeReport, NoProgress};
use crate::progress::TraceProgress;
use crate::ui;

pub fn run(ctx: &Context, host: &Esxcli, config: &NetworkConfig, args: ApplyArgs) -> Result<()> {
    if args.json {
        let report = engine::converge(host, config, &mut NoProgress)?;
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    if !ctx.quiet {
        ui::header("Applying network configuration");
        if host.is_dry_run() {
            ui::info("Dry run - changes are logged, not made");
        }
    }

    let mut progress = TraceProgress::new(ctx.quiet);
    let report = engine::converge(host, config, &mut progress)?;
    display_summary(ctx, &report);
    Ok(())
}

fn display_summary(ctx: &Context, report: &ConvergeReport) {
    let summary = &report.translation.summary;
    if ctx.quiet && summary.is_success() {
        return;
    }

    ui::section("Summary");
    ui::kv("Removed", &report.wipe.total().to_string());
    ui::kv("Configured", &summary.configured.to_string().green().to_string());
    ui::kv("Skipped", &summary.skipped.to_string());
    if summary.failed > 0 {
        ui::kv("Failed", &summary.failed.to_string().red().to_string());
    }
    ui::kv("Warnings", &report.translation.warnings.len().to_string());

    println!();
    if summary.is_success() {
        ui::success("Host network configuration applied");
    } else {
        ui::warn(&format!(
            "{} device(s) could not be configured; see warnings above",
            summary.failed
        ));
    }
}
