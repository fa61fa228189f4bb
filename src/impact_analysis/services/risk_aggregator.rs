use super::remediation_planner::RemediationPlanner;
use crate::impact_analysis::domain::{
    ImpactSet, PackageNode, RankedVulnerability, RiskReport, VulnerabilityRecord,
};
use std::collections::BTreeMap;

/// Default multiplier applied to the log-scaled impact breadth
pub const DEFAULT_BREADTH_WEIGHT: f64 = 1.0;

/// RiskAggregator service combining CVSS scores, exposure breadth and fix
/// availability into a ranked remediation list.
///
/// The computation is a pure function of its inputs; the only tunable is
/// the breadth weight.
#[derive(Debug, Clone, Copy)]
pub struct RiskAggregator {
    breadth_weight: f64,
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BREADTH_WEIGHT)
    }
}

impl RiskAggregator {
    pub fn new(breadth_weight: f64) -> Self {
        Self { breadth_weight }
    }

    /// `cvss + breadth_weight * ln(1 + impacted_files)`.
    ///
    /// The logarithm keeps a vulnerability imported by thousands of files
    /// from outranking a more severe one with narrower exposure.
    pub fn risk_score(&self, cvss_score: f64, impacted_files: usize) -> f64 {
        cvss_score + self.breadth_weight * (impacted_files as f64).ln_1p()
    }

    /// Builds the risk report for `package` from the vulnerabilities known to
    /// affect it and the impact set computed for it.
    ///
    /// Records failing validation are skipped and counted. When the same
    /// cve_id appears twice the later record wins.
    pub fn aggregate_risk(
        &self,
        package: &PackageNode,
        vulns: &[VulnerabilityRecord],
        impact: &ImpactSet,
    ) -> RiskReport {
        let current_version = package.version.as_deref();
        let impacted_files = impact.impacted_file_count();

        let mut skipped_records = 0;
        let mut latest: BTreeMap<&str, &VulnerabilityRecord> = BTreeMap::new();
        for record in vulns {
            match record.validate() {
                Ok(()) => {
                    latest.insert(record.cve_id.trim(), record);
                }
                Err(e) => {
                    tracing::warn!(package = %package.package, error = %e, "Skipping invalid record in risk aggregation");
                    skipped_records += 1;
                }
            }
        }

        let effective: Vec<&VulnerabilityRecord> = latest.into_values().collect();

        let mut ranked: Vec<RankedVulnerability> = effective
            .iter()
            .map(|record| RankedVulnerability {
                cve_id: record.cve_id.trim().to_string(),
                severity: record.severity_bucket(),
                reported_severity: record.severity,
                cvss_score: record.cvss_score,
                impacted_files,
                risk_score: self.risk_score(record.cvss_score, impacted_files),
                remediation: RemediationPlanner::plan(current_version, &record.affected_ranges),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.risk_score.total_cmp(&a.risk_score))
                .then_with(|| a.cve_id.cmp(&b.cve_id))
        });

        let recommended_version = if effective.is_empty() {
            None
        } else {
            RemediationPlanner::recommend(
                current_version,
                effective
                    .iter()
                    .flat_map(|record| record.affected_ranges.iter()),
            )
        };

        RiskReport {
            package: package.package.clone(),
            current_version: package.version.clone(),
            ranked,
            recommended_version,
            impacted_files,
            skipped_records,
        }
    }
}
