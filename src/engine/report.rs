//! Outcomes, warnings and progress reporting for a translation run.

use serde::Serialize;

/// A non-fatal problem. The device, subnet or route it names was skipped;
/// everything else carried on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Device the warning is about, if any
    pub device: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.device {
            Some(device) => write!(f, "{device}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// How a single device ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceOutcome {
    /// Device was fully translated
    Configured,
    /// Device intentionally left alone
    Skipped { reason: String },
    /// Device was abandoned part-way; commands already issued stay applied
    Failed { reason: String },
}

impl DeviceOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReport {
    /// Logical device id (`nameservers` for the DNS block)
    pub id: String,
    pub kind: String,
    #[serde(flatten)]
    pub outcome: DeviceOutcome,
}

/// Counts of device outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub configured: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    /// Add an outcome to the summary
    pub fn add(&mut self, outcome: &DeviceOutcome) {
        match outcome {
            DeviceOutcome::Configured => self.configured += 1,
            DeviceOutcome::Skipped { .. } => self.skipped += 1,
            DeviceOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Whether every device either configured or was deliberately skipped
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Counts of what the wipe removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WipeSummary {
    pub vmknics: usize,
    pub vswitches: usize,
    pub dns_servers: usize,
    pub search_domains: usize,
}

impl WipeSummary {
    /// Total number of objects removed
    pub fn total(&self) -> usize {
        self.vmknics + self.vswitches + self.dns_servers + self.search_domains
    }
}

/// Everything a translation run produced, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationReport {
    pub devices: Vec<DeviceReport>,
    pub warnings: Vec<Warning>,
    pub summary: Summary,
}

#[cfg(test)]
impl TranslationReport {
    /// Outcome for a device id, if it was processed.
    pub fn outcome(&self, id: &str) -> Option<&DeviceOutcome> {
        self.devices.iter().find(|d| d.id == id).map(|d| &d.outcome)
    }
}

/// Report for a full `apply`: the wipe followed by the translation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvergeReport {
    pub wipe: WipeSummary,
    #[serde(flatten)]
    pub translation: TranslationReport,
}

/// Receives progress updates while devices are translated.
pub trait ProgressCallback {
    /// Called before a device is translated
    fn on_device_start(&mut self, index: usize, total: usize, id: &str, kind: &str);

    /// Called after a device is translated, with the warnings it raised
    fn on_device_complete(&mut self, report: &DeviceReport, warnings: &[Warning]);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_device_start(&mut self, _index: usize, _total: usize, _id: &str, _kind: &str) {}
    fn on_device_complete(&mut self, _report: &DeviceReport, _warnings: &[Warning]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = Summary::default();
        summary.add(&DeviceOutcome::Configured);
        summary.add(&DeviceOutcome::skipped("no subnets"));
        summary.add(&DeviceOutcome::failed("no uplink"));
        assert_eq!(summary.configured, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_device_report_json() {
        let report = DeviceReport {
            id: "eth0".into(),
            kind: "physical".into(),
            outcome: DeviceOutcome::skipped("no addressable subnets"),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["id"], "eth0");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no addressable subnets");
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning {
            device: Some("bond0".into()),
            message: "unsupported bond mode balance-xor".into(),
        };
        assert_eq!(warning.to_string(), "bond0: unsupported bond mode balance-xor");
    }
}
