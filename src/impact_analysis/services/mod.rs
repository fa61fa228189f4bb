pub mod remediation_planner;
pub mod risk_aggregator;
pub mod version_matcher;

pub use remediation_planner::RemediationPlanner;
pub use risk_aggregator::{RiskAggregator, DEFAULT_BREADTH_WEIGHT};
pub use version_matcher::{MatchOutcome, VersionMatcher};
