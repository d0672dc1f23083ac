//! Progress trace for the apply command.

use colored::Colorize;

use crate::engine::{DeviceOutcome, DeviceReport, ProgressCallback, Warning};
use crate::ui;

/// Prints one step line per device and its warnings as they happen.
pub struct TraceProgress {
    quiet: bool,
}

impl TraceProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

/// Warnings to print for a finished device. A failed device already shows
/// its reason on the `✗` line, so the warning carrying that reason is left out.
fn extra_warnings<'a>(report: &DeviceReport, warnings: &'a [Warning]) -> Vec<&'a Warning> {
    let reason = match &report.outcome {
        DeviceOutcome::Failed { reason } => Some(reason.as_str()),
        _ => None,
    };
    warnings
        .iter()
        .filter(|w| Some(w.message.as_str()) != reason)
        .collect()
}

impl ProgressCallback for TraceProgress {
    fn on_device_start(&mut self, index: usize, total: usize, id: &str, kind: &str) {
        if !self.quiet {
            ui::step(index + 1, total, &format!("{kind} {}", id.bold()));
        }
    }

    fn on_device_complete(&mut self, report: &DeviceReport, warnings: &[Warning]) {
        for warning in extra_warnings(report, warnings) {
            ui::warn(&warning.message);
        }
        match &report.outcome {
            DeviceOutcome::Configured if !self.quiet => ui::dim("configured"),
            DeviceOutcome::Skipped { reason } if !self.quiet => {
                ui::dim(&format!("skipped: {reason}"))
            }
            DeviceOutcome::Failed { reason } => {
                println!("  {} {}", "✗".red(), reason);
            }
            _ => {}
        }
    }
}
