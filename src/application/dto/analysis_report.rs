use crate::impact_analysis::domain::{
    AnnotationBatch, GraphStats, ImpactSet, RiskReport, Severity, TraversalSeed,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Counts of graph mutations performed while applying scan records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub files: usize,
    pub imports: usize,
    /// Imports skipped because they are relative (`./x`, `..y`) or empty
    pub skipped_imports: usize,
    pub packages: usize,
    pub module_links: usize,
    pub dependencies: usize,
    /// Module links or dependencies naming a package absent from the records
    pub dangling_references: usize,
}

/// A seed that could not be traversed, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedSeed {
    pub seed: TraversalSeed,
    pub reason: String,
}

/// AnalysisReport - structured result of one scan analysis.
///
/// This is the engine's full output: annotation diagnostics, impact sets per
/// seed, per-package risk reports and the final graph shape. Rendering it is
/// left to whoever consumes the JSON.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub build: BuildSummary,
    pub annotation: AnnotationBatch,
    pub impacts: Vec<ImpactSet>,
    pub risks: Vec<RiskReport>,
    pub unresolved_seeds: Vec<UnresolvedSeed>,
    pub graph: GraphStats,
    pub fail_on_severity: Severity,
}

impl AnalysisReport {
    pub fn new(
        build: BuildSummary,
        annotation: AnnotationBatch,
        graph: GraphStats,
        fail_on_severity: Severity,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            build,
            annotation,
            impacts: Vec::new(),
            risks: Vec::new(),
            unresolved_seeds: Vec::new(),
            graph,
            fail_on_severity,
        }
    }

    /// Number of ranked vulnerabilities at or above the fail threshold
    pub fn failing_vulnerability_count(&self) -> usize {
        self.risks
            .iter()
            .map(|r| r.count_at_or_above(self.fail_on_severity))
            .sum()
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.failing_vulnerability_count() > 0
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.risks.iter().filter_map(RiskReport::highest_severity).max()
    }

    pub fn truncated_impacts(&self) -> usize {
        self.impacts.iter().filter(|i| i.truncated).count()
    }
}
