//! Normalized records supplied by the manifest-parsing and
//! import-extraction collaborators.

use super::package::{Ecosystem, PackageRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub ecosystem: Ecosystem,
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageRecord {
    pub fn new(name: &str, ecosystem: Ecosystem, version: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            ecosystem,
            version: version.map(String::from),
        }
    }

    pub fn package_ref(&self) -> PackageRef {
        PackageRef::new(&self.name, self.ecosystem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    #[serde(alias = "file_path")]
    pub file_path: String,
    #[serde(alias = "module_name")]
    pub module_name: String,
}

impl ImportRecord {
    pub fn new(file_path: &str, module_name: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            module_name: module_name.to_string(),
        }
    }
}

/// Resolution of an imported module name to a declared manifest dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLinkRecord {
    pub module: String,
    pub package: String,
    pub ecosystem: Ecosystem,
}

/// A declared package-to-package dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub dependent: String,
    pub dependency: String,
    pub ecosystem: Ecosystem,
}

/// Normalizes an imported module name to its top-level importable unit.
///
/// `os.path` -> `os`, `lodash/fp` -> `lodash`, `@scope/pkg/sub` -> `@scope/pkg`.
/// Relative imports (`./util`, `..models`) have no package and yield `None`.
pub fn top_level_module(module_name: &str) -> Option<String> {
    let trimmed = module_name.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        return None;
    }

    if trimmed.starts_with('@') {
        let mut parts = trimmed.splitn(3, '/');
        let scope = parts.next()?;
        return match parts.next() {
            Some(name) if !name.is_empty() => Some(format!("{}/{}", scope, name)),
            _ => None,
        };
    }

    trimmed
        .split(['/', '.'])
        .next()
        .filter(|head| !head.is_empty())
        .map(String::from)
}
