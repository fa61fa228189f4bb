use super::package::PackageRef;
use crate::shared::error::ImpactError;
use serde::Serialize;

/// A vulnerability record rejected as malformed upstream data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    pub cve_id: String,
    pub reason: String,
}

impl From<ImpactError> for RejectedRecord {
    fn from(error: ImpactError) -> Self {
        match error {
            ImpactError::UpstreamDataError { cve_id, reason } => Self { cve_id, reason },
            other => Self {
                cve_id: "<unknown>".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Outcome of annotating one package with a batch of vulnerability records.
///
/// Counts are reported even on partial failure; a rejected record never
/// aborts the rest of the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationResult {
    pub package: PackageRef,
    pub vulnerabilities_processed: usize,
    pub edges_created: usize,
    pub edges_skipped: usize,
    /// AFFECTED_BY edges from an earlier annotation that no longer match
    /// the package's current version
    pub edges_removed: usize,
    pub unresolved_version_edges: usize,
    /// Versions or range expressions that could not be parsed and were
    /// treated as not affected
    pub unparseable_versions: usize,
    pub rejected: Vec<RejectedRecord>,
}

impl AnnotationResult {
    pub fn new(package: PackageRef) -> Self {
        Self {
            package,
            vulnerabilities_processed: 0,
            edges_created: 0,
            edges_skipped: 0,
            edges_removed: 0,
            unresolved_version_edges: 0,
            unparseable_versions: 0,
            rejected: Vec::new(),
        }
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Aggregated outcome of annotating many packages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationBatch {
    pub results: Vec<AnnotationResult>,
    /// Packages named by advisories that do not exist in the graph
    pub missing_packages: Vec<PackageRef>,
}

impl AnnotationBatch {
    pub fn total_processed(&self) -> usize {
        self.results.iter().map(|r| r.vulnerabilities_processed).sum()
    }

    pub fn total_edges_created(&self) -> usize {
        self.results.iter().map(|r| r.edges_created).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.results.iter().map(AnnotationResult::rejected_count).sum()
    }

    pub fn total_unparseable(&self) -> usize {
        self.results.iter().map(|r| r.unparseable_versions).sum()
    }

    pub fn result_for(&self, package: &PackageRef) -> Option<&AnnotationResult> {
        self.results.iter().find(|r| &r.package == package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact_analysis::domain::package::Ecosystem;

    #[test]
    fn test_rejected_record_from_upstream_error() {
        let rejected = RejectedRecord::from(ImpactError::UpstreamDataError {
            cve_id: "CVE-1".to_string(),
            reason: "cvss_score 15 is outside [0, 10]".to_string(),
        });
        assert_eq!(rejected.cve_id, "CVE-1");
        assert!(rejected.reason.contains("15"));
    }

    #[test]
    fn test_batch_totals() {
        let mut first = AnnotationResult::new(PackageRef::new("a", Ecosystem::Python));
        first.vulnerabilities_processed = 4;
        first.edges_created = 2;
        first.rejected.push(RejectedRecord {
            cve_id: "CVE-9".to_string(),
            reason: "bad".to_string(),
        });
        let mut second = AnnotationResult::new(PackageRef::new("b", Ecosystem::Python));
        second.vulnerabilities_processed = 1;
        second.unparseable_versions = 1;

        let batch = AnnotationBatch {
            results: vec![first, second],
            missing_packages: vec![],
        };
        assert_eq!(batch.total_processed(), 5);
        assert_eq!(batch.total_edges_created(), 2);
        assert_eq!(batch.total_rejected(), 1);
        assert_eq!(batch.total_unparseable(), 1);
    }
}
