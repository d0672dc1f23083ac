//! Convergence engine for esxnet
//!
//! The engine orchestrates:
//! 1. Wiping - Remove every vmknic, vSwitch and DNS entry from the host
//! 2. Mapping - Correlate document devices with live physical adapters
//! 3. Translating - Emit esxcli operations for each device, in document order

pub mod bond;
pub mod context;
pub mod mapper;
pub mod naming;
pub mod report;
pub mod subnet;
pub mod translator;
pub mod wiper;

use anyhow::{Context, Result};
use esxkit::Esxcli;
use netplan::NetworkConfig;

pub use context::RunContext;
pub use mapper::CorrelationTables;
pub use report::{
    ConvergeReport, DeviceOutcome, DeviceReport, NoProgress, ProgressCallback, Warning,
};
pub use translator::translate;
pub use wiper::wipe;

/// Bring the host from whatever state it is in to the one `config` describes.
pub fn converge(
    host: &Esxcli,
    config: &NetworkConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ConvergeReport> {
    let wipe = wipe(host).context("Failed to wipe existing network configuration")?;

    let nics = host.list_nics().context("Failed to list physical adapters")?;
    log::debug!("found {} physical adapters", nics.len());

    let mut ctx = RunContext::new(CorrelationTables::build(&nics, &config.config));
    let translation = translate(host, &mut ctx, &config.config, progress)?;

    Ok(ConvergeReport { wipe, translation })
}
