use crate::impact_analysis::domain::{
    DependencyRecord, Ecosystem, ImportRecord, ModuleLinkRecord, PackageRecord, PackageRef,
    VulnerabilityRecord,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Vulnerability records fetched for one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageAdvisories {
    pub name: String,
    pub ecosystem: Ecosystem,
    #[serde(default, deserialize_with = "deserialize_records")]
    pub vulnerabilities: Vec<VulnerabilityRecord>,
}

/// Decodes each record on its own. An entry that does not decode becomes a
/// malformed placeholder, which annotation later rejects.
fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<VulnerabilityRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(entries.into_iter().map(decode_record).collect())
}

fn decode_record(entry: serde_json::Value) -> VulnerabilityRecord {
    let cve_id = entry
        .get("cve_id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    serde_json::from_value(entry).unwrap_or_else(|e| {
        tracing::warn!(cve_id = %cve_id, error = %e, "Malformed vulnerability record");
        VulnerabilityRecord::malformed(&cve_id, &e.to_string())
    })
}

impl PackageAdvisories {
    pub fn new(name: &str, ecosystem: Ecosystem, vulnerabilities: Vec<VulnerabilityRecord>) -> Self {
        Self {
            name: name.to_string(),
            ecosystem,
            vulnerabilities,
        }
    }

    pub fn package_ref(&self) -> PackageRef {
        PackageRef::new(&self.name, self.ecosystem)
    }
}

/// ScanRecords - everything the collaborators produced for one scan.
///
/// Every section is optional in the input document so a collaborator that
/// found nothing may simply omit its section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRecords {
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    #[serde(default)]
    pub imports: Vec<ImportRecord>,
    #[serde(default, alias = "moduleLinks")]
    pub module_links: Vec<ModuleLinkRecord>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
    #[serde(default)]
    pub advisories: Vec<PackageAdvisories>,
}

impl ScanRecords {
    /// Advisory records for `package`, merged across every advisory entry
    /// that names it
    pub fn advisories_for(&self, package: &PackageRef) -> Vec<VulnerabilityRecord> {
        self.advisories
            .iter()
            .filter(|entry| &entry.package_ref() == package)
            .flat_map(|entry| entry.vulnerabilities.iter().cloned())
            .collect()
    }

    pub fn vulnerability_record_count(&self) -> usize {
        self.advisories.iter().map(|a| a.vulnerabilities.len()).sum()
    }
}
