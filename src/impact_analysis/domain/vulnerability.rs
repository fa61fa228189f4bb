use crate::shared::error::ImpactError;
use crate::shared::EngineResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity bucket for a vulnerability.
///
/// Variants are declared from least to most severe so that the derived
/// ordering sorts `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Buckets a CVSS score using fixed thresholds:
    /// `>= 9.0` Critical, `>= 7.0` High, `>= 4.0` Medium, otherwise Low.
    pub fn from_cvss_score(score: f64) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" | "NONE" => Ok(Severity::Low),
            "MEDIUM" | "MODERATE" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            _ => Err(format!(
                "Invalid severity: {}. Expected one of: critical, high, medium, low",
                s
            )),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized vulnerability record as delivered by the NVD/GitHub collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    #[serde(default)]
    pub cve_id: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    pub cvss_score: f64,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub affected_ranges: Vec<String>,
    /// Decode failure of the upstream entry this record stands in for
    #[serde(skip)]
    malformed: Option<String>,
}

impl VulnerabilityRecord {
    pub fn new(cve_id: &str, severity: Severity, cvss_score: f64, affected_ranges: &[&str]) -> Self {
        Self {
            cve_id: cve_id.to_string(),
            severity,
            description: String::new(),
            cvss_score,
            published_date: None,
            affected_ranges: affected_ranges.iter().map(|r| r.to_string()).collect(),
            malformed: None,
        }
    }

    /// Placeholder for an upstream entry that could not be decoded. It
    /// always fails `validate` with `reason`.
    pub fn malformed(cve_id: &str, reason: &str) -> Self {
        Self {
            malformed: Some(reason.to_string()),
            ..Self::new(cve_id.trim(), Severity::Low, f64::NAN, &[])
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_published_date(mut self, date: NaiveDate) -> Self {
        self.published_date = Some(date);
        self
    }

    /// Checks the fields the engine relies on.
    ///
    /// # Errors
    /// `UpstreamDataError` when the entry could not be decoded, the cve_id
    /// is blank or the CVSS score is not a finite number within `[0, 10]`.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(reason) = &self.malformed {
            let cve_id = match self.cve_id.trim() {
                "" => "<missing>",
                id => id,
            };
            return Err(ImpactError::UpstreamDataError {
                cve_id: cve_id.to_string(),
                reason: reason.clone(),
            });
        }

        if self.cve_id.trim().is_empty() {
            return Err(ImpactError::UpstreamDataError {
                cve_id: "<missing>".to_string(),
                reason: "record has no cve_id".to_string(),
            });
        }

        if !self.cvss_score.is_finite() || !(0.0..=10.0).contains(&self.cvss_score) {
            return Err(ImpactError::UpstreamDataError {
                cve_id: self.cve_id.clone(),
                reason: format!("cvss_score {} is outside [0, 10]", self.cvss_score),
            });
        }

        Ok(())
    }

    /// Severity bucket derived from the CVSS score
    pub fn severity_bucket(&self) -> Severity {
        Severity::from_cvss_score(self.cvss_score)
    }
}
