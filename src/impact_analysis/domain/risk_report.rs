use super::package::PackageRef;
use super::vulnerability::Severity;
use serde::Serialize;

/// Suggested remediation for a single vulnerability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Remediation {
    UpgradeTo { version: String },
    NoKnownFix,
}

impl Remediation {
    pub fn upgrade_version(&self) -> Option<&str> {
        match self {
            Remediation::UpgradeTo { version } => Some(version),
            Remediation::NoKnownFix => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVulnerability {
    pub cve_id: String,
    /// Bucket derived from the CVSS score
    pub severity: Severity,
    /// Severity as reported upstream
    pub reported_severity: Severity,
    pub cvss_score: f64,
    pub impacted_files: usize,
    pub risk_score: f64,
    pub remediation: Remediation,
}

/// Prioritized remediation list for one package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub package: PackageRef,
    pub current_version: Option<String>,
    /// Ordered by severity bucket desc, risk score desc, cve_id asc
    pub ranked: Vec<RankedVulnerability>,
    /// Smallest version clearing every known range of every ranked vulnerability
    pub recommended_version: Option<String>,
    pub impacted_files: usize,
    /// Records dropped because they failed validation
    pub skipped_records: usize,
}

impl RiskReport {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.ranked.iter().map(|v| v.severity).max()
    }

    pub fn count_at_or_above(&self, threshold: Severity) -> usize {
        self.ranked.iter().filter(|v| v.severity >= threshold).count()
    }
}
