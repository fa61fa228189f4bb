use vuln_impact::application::dto::PackageAdvisories;
use vuln_impact::impact_analysis::domain::{
    DependencyRecord, ImportRecord, ModuleLinkRecord, PackageRecord,
};
use vuln_impact::prelude::*;

pub fn package(name: &str, ecosystem: Ecosystem, version: Option<&str>) -> PackageRecord {
    PackageRecord::new(name, ecosystem, version)
}

pub fn import(file_path: &str, module_name: &str) -> ImportRecord {
    ImportRecord::new(file_path, module_name)
}

pub fn link(module: &str, package: &str, ecosystem: Ecosystem) -> ModuleLinkRecord {
    ModuleLinkRecord {
        module: module.to_string(),
        package: package.to_string(),
        ecosystem,
    }
}

pub fn depends(dependent: &str, dependency: &str, ecosystem: Ecosystem) -> DependencyRecord {
    DependencyRecord {
        dependent: dependent.to_string(),
        dependency: dependency.to_string(),
        ecosystem,
    }
}

pub fn advisory(
    name: &str,
    ecosystem: Ecosystem,
    vulnerabilities: Vec<VulnerabilityRecord>,
) -> PackageAdvisories {
    PackageAdvisories::new(name, ecosystem, vulnerabilities)
}

/// `src/index.js` imports `left-pad@1.0.0`, affected by CVE-2020-0001 (<1.0.1)
pub fn left_pad_scan() -> ScanRecords {
    ScanRecords {
        packages: vec![package("left-pad", Ecosystem::JavaScript, Some("1.0.0"))],
        imports: vec![import("src/index.js", "left-pad")],
        module_links: vec![link("left-pad", "left-pad", Ecosystem::JavaScript)],
        dependencies: vec![],
        advisories: vec![advisory(
            "left-pad",
            Ecosystem::JavaScript,
            vec![VulnerabilityRecord::new(
                "CVE-2020-0001",
                Severity::High,
                8.5,
                &["<1.0.1"],
            )
            .with_description("Denial of service via crafted padding length")],
        )],
    }
}

/// JSON form of `left_pad_scan` as the collaborators would emit it
pub const LEFT_PAD_SCAN_JSON: &str = r#"{
  "packages": [
    {"name": "left-pad", "ecosystem": "npm", "version": "1.0.0"}
  ],
  "imports": [
    {"filePath": "src/index.js", "moduleName": "left-pad"},
    {"filePath": "src/index.js", "moduleName": "./helpers"}
  ],
  "module_links": [
    {"module": "left-pad", "package": "left-pad", "ecosystem": "npm"}
  ],
  "advisories": [
    {
      "name": "left-pad",
      "ecosystem": "npm",
      "vulnerabilities": [
        {
          "cve_id": "CVE-2020-0001",
          "severity": "HIGH",
          "description": "Denial of service via crafted padding length",
          "cvss_score": 8.5,
          "published_date": "2020-03-01",
          "affected_ranges": ["<1.0.1"]
        }
      ]
    }
  ]
}"#;
