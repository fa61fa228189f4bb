use crate::impact_analysis::domain::{ParsedVersion, Remediation, VersionRange};

/// RemediationPlanner service proposing the smallest upgrade that leaves
/// every known affected range.
///
/// Candidate versions are the points just past each range's upper bounds
/// (`<2.0.0` yields `2.0.0`, `<=1.4.2` yields `1.4.3`). A candidate is kept
/// when it is newer than the current version and inside none of the ranges.
pub struct RemediationPlanner;

impl RemediationPlanner {
    /// Plans a fix for one vulnerability given its affected ranges.
    pub fn plan(current_version: Option<&str>, affected_ranges: &[String]) -> Remediation {
        let ranges = Self::parse_ranges(affected_ranges);
        match Self::minimal_fix(Self::parse_current(current_version).as_ref(), &ranges) {
            Some(version) => Remediation::UpgradeTo {
                version: version.to_string(),
            },
            None => Remediation::NoKnownFix,
        }
    }

    /// Smallest version clearing every range in `affected_ranges` at once.
    pub fn recommend<'a>(
        current_version: Option<&str>,
        affected_ranges: impl IntoIterator<Item = &'a String>,
    ) -> Option<String> {
        let ranges: Vec<String> = affected_ranges.into_iter().cloned().collect();
        let ranges = Self::parse_ranges(&ranges);
        Self::minimal_fix(Self::parse_current(current_version).as_ref(), &ranges)
            .map(|version| version.to_string())
    }

    fn minimal_fix(current: Option<&ParsedVersion>, ranges: &[VersionRange]) -> Option<ParsedVersion> {
        if ranges.is_empty() {
            return None;
        }

        ranges
            .iter()
            .flat_map(VersionRange::escape_versions)
            .filter(|candidate| current.map_or(true, |current| candidate > current))
            .filter(|candidate| !ranges.iter().any(|range| range.contains(candidate)))
            .min()
    }

    fn parse_current(current_version: Option<&str>) -> Option<ParsedVersion> {
        current_version.and_then(|version| ParsedVersion::parse(version).ok())
    }

    fn parse_ranges(affected_ranges: &[String]) -> Vec<VersionRange> {
        affected_ranges
            .iter()
            .filter_map(|expression| match VersionRange::parse(expression) {
                Ok(range) => Some(range),
                Err(e) => {
                    tracing::debug!(range = %expression, error = %e, "Ignoring unparseable range for remediation");
                    None
                }
            })
            .collect()
    }
}
