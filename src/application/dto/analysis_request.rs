use crate::impact_analysis::domain::{Severity, TraversalSeed};
use crate::impact_analysis::services::DEFAULT_BREADTH_WEIGHT;
use std::path::PathBuf;

/// AnalysisRequest - Internal request DTO for the analyze-scan use case
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Path to the scan-records JSON document
    pub input_path: PathBuf,
    /// Traversal seeds; empty means every package with a confirmed
    /// vulnerability
    pub seeds: Vec<TraversalSeed>,
    /// Maximum reverse hops; `None` is unbounded
    pub max_depth: Option<u32>,
    /// Severity bucket at or above which the report counts as failing
    pub fail_on_severity: Severity,
    /// Log-scale multiplier for impact breadth in risk scores
    pub breadth_weight: f64,
    /// Fan-out width for traversal levels and per-package annotation
    pub max_concurrency: usize,
}

/// Default fan-out width
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

impl AnalysisRequest {
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path,
            seeds: Vec::new(),
            max_depth: None,
            fail_on_severity: Severity::High,
            breadth_weight: DEFAULT_BREADTH_WEIGHT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_seeds(mut self, seeds: Vec<TraversalSeed>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fail_on_severity(mut self, severity: Severity) -> Self {
        self.fail_on_severity = severity;
        self
    }

    pub fn with_breadth_weight(mut self, breadth_weight: f64) -> Self {
        self.breadth_weight = breadth_weight;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}
