//! Per-run state threaded through every device handler.

use super::mapper::CorrelationTables;
use super::naming::NamingAllocator;
use super::report::Warning;

/// Tables, counters and accumulated warnings for a single run.
#[derive(Debug, Default)]
pub struct RunContext {
    pub tables: CorrelationTables,
    pub names: NamingAllocator,
    pub warnings: Vec<Warning>,
}

impl RunContext {
    pub fn new(tables: CorrelationTables) -> Self {
        Self {
            tables,
            names: NamingAllocator::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a non-fatal problem. The CLI shows it through the progress
    /// callback, so the log only carries it at debug.
    pub fn warn(&mut self, device: Option<&str>, message: impl Into<String>) {
        let warning = Warning {
            device: device.map(String::from),
            message: message.into(),
        };
        log::debug!("{warning}");
        self.warnings.push(warning);
    }
}
