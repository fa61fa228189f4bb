use super::package::PackageRef;
use serde::Serialize;
use std::fmt;

/// Starting point of an impact traversal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraversalSeed {
    Vulnerability { cve_id: String },
    Package(PackageRef),
}

impl TraversalSeed {
    pub fn vulnerability(cve_id: &str) -> Self {
        TraversalSeed::Vulnerability {
            cve_id: cve_id.trim().to_string(),
        }
    }

    pub fn package(package: PackageRef) -> Self {
        TraversalSeed::Package(package)
    }
}

impl fmt::Display for TraversalSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalSeed::Vulnerability { cve_id } => f.write_str(cve_id),
            TraversalSeed::Package(package) => write!(f, "{}", package),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactedFile {
    pub path: String,
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactedModule {
    pub name: String,
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactedPackage {
    pub package: PackageRef,
    pub depth: u32,
}

/// Transitive impact of a vulnerability or package.
///
/// Depth counts reverse hops from the vulnerable package(s), which sit at
/// depth 0. Every node appears once, at the shortest depth it was reached.
/// `truncated` distinguishes "no more impact" from "traversal stopped early".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSet {
    pub seed: TraversalSeed,
    /// Vulnerabilities the traversal originated from
    pub vulnerabilities: Vec<String>,
    pub packages: Vec<ImpactedPackage>,
    pub modules: Vec<ImpactedModule>,
    pub files: Vec<ImpactedFile>,
    pub max_depth: Option<u32>,
    pub truncated: bool,
    pub cancelled: bool,
}

impl ImpactSet {
    pub fn empty(seed: TraversalSeed, max_depth: Option<u32>) -> Self {
        Self {
            seed,
            vulnerabilities: Vec::new(),
            packages: Vec::new(),
            modules: Vec::new(),
            files: Vec::new(),
            max_depth,
            truncated: false,
            cancelled: false,
        }
    }

    pub fn file_depth(&self, path: &str) -> Option<u32> {
        self.files.iter().find(|f| f.path == path).map(|f| f.depth)
    }

    pub fn module_depth(&self, name: &str) -> Option<u32> {
        self.modules.iter().find(|m| m.name == name).map(|m| m.depth)
    }

    pub fn package_depth(&self, package: &PackageRef) -> Option<u32> {
        self.packages
            .iter()
            .find(|p| &p.package == package)
            .map(|p| p.depth)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.file_depth(path).is_some()
    }

    /// Number of distinct impacted files
    pub fn impacted_file_count(&self) -> usize {
        self.files.len()
    }

    /// Sorts every collection by (depth, identity) so serialized output is stable
    pub(crate) fn normalize(&mut self) {
        self.vulnerabilities.sort();
        self.vulnerabilities.dedup();
        self.packages
            .sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.package.cmp(&b.package)));
        self.modules
            .sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.name.cmp(&b.name)));
        self.files
            .sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.path.cmp(&b.path)));
    }
}
