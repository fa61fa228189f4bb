use crate::impact_analysis::domain::{ParsedVersion, VersionRange};
use crate::shared::EngineResult;

/// Result of checking one version against one range expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Affected,
    NotAffected,
    /// Either side failed to parse; callers count these so risk is never
    /// silently underestimated
    Unparseable,
}

/// VersionMatcher service deciding whether a concrete version falls inside
/// an affected-version range.
///
/// Every function is pure: identical inputs always produce identical
/// outputs, so the matcher is safe to call from concurrent tasks.
pub struct VersionMatcher;

impl VersionMatcher {
    /// Parses a concrete version string.
    ///
    /// # Errors
    /// `InvalidVersion` when the string is not a recognizable version.
    pub fn parse(version: &str) -> EngineResult<ParsedVersion> {
        ParsedVersion::parse(version)
    }

    /// Parses a range expression such as `>=1.2.0,<2.0.0` or `^1.4`.
    pub fn parse_range(range_expr: &str) -> EngineResult<VersionRange> {
        VersionRange::parse(range_expr)
    }

    /// Evaluates `version` against `range_expr` without discarding parse failures.
    pub fn evaluate(version: &str, range_expr: &str) -> MatchOutcome {
        let parsed = match Self::parse(version) {
            Ok(parsed) => parsed,
            Err(_) => return MatchOutcome::Unparseable,
        };
        match Self::parse_range(range_expr) {
            Ok(range) if range.contains(&parsed) => MatchOutcome::Affected,
            Ok(_) => MatchOutcome::NotAffected,
            Err(_) => MatchOutcome::Unparseable,
        }
    }

    /// Returns whether `version` is inside `range_expr`.
    ///
    /// Fails closed: unparseable input is logged and reported as not matching.
    pub fn matches(version: &str, range_expr: &str) -> bool {
        match Self::evaluate(version, range_expr) {
            MatchOutcome::Affected => true,
            MatchOutcome::NotAffected => false,
            MatchOutcome::Unparseable => {
                tracing::warn!(
                    version,
                    range = range_expr,
                    "Unparseable version or range, treating as not affected"
                );
                false
            }
        }
    }
}
