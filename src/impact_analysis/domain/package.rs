use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Package-manager namespace a package belongs to.
///
/// The same package name may exist independently in several ecosystems,
/// so the ecosystem is part of every package's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Ecosystem {
    Python,
    JavaScript,
    Rust,
    Go,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Python => "python",
            Ecosystem::JavaScript => "javascript",
            Ecosystem::Rust => "rust",
            Ecosystem::Go => "go",
        }
    }

    /// Normalizes a package name the way the ecosystem's registry does.
    ///
    /// PyPI treats `Foo_Bar`, `foo-bar` and `foo.bar` as the same project;
    /// npm names are lowercase. Crates and Go modules are kept as written.
    pub fn normalize_name(&self, name: &str) -> String {
        let trimmed = name.trim();
        match self {
            Ecosystem::Python => trimmed.to_lowercase().replace(['_', '.'], "-"),
            Ecosystem::JavaScript => trimmed.to_lowercase(),
            Ecosystem::Rust | Ecosystem::Go => trimmed.to_string(),
        }
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "pypi" | "py" => Ok(Ecosystem::Python),
            "javascript" | "js" | "npm" | "node" => Ok(Ecosystem::JavaScript),
            "rust" | "cargo" | "crates.io" => Ok(Ecosystem::Rust),
            "go" | "golang" => Ok(Ecosystem::Go),
            _ => Err(format!(
                "Unknown ecosystem: {}. Expected one of: python, javascript, rust, go",
                s
            )),
        }
    }
}

impl TryFrom<String> for Ecosystem {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a Package node: `(name, ecosystem)`.
///
/// The name is stored in its ecosystem-normalized form so that lookups
/// with differently-cased or differently-separated names hit the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageRef {
    name: String,
    ecosystem: Ecosystem,
}

impl PackageRef {
    pub fn new(name: &str, ecosystem: Ecosystem) -> Self {
        Self {
            name: ecosystem.normalize_name(name),
            ecosystem,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ecosystem, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecosystem_from_str_aliases() {
        assert_eq!("PyPI".parse::<Ecosystem>().unwrap(), Ecosystem::Python);
        assert_eq!("npm".parse::<Ecosystem>().unwrap(), Ecosystem::JavaScript);
        assert_eq!("crates.io".parse::<Ecosystem>().unwrap(), Ecosystem::Rust);
        assert_eq!("golang".parse::<Ecosystem>().unwrap(), Ecosystem::Go);
    }

    #[test]
    fn test_ecosystem_from_str_invalid() {
        let error = "maven".parse::<Ecosystem>().unwrap_err();
        assert!(error.contains("Unknown ecosystem"));
        assert!(error.contains("maven"));
    }

    #[test]
    fn test_ecosystem_deserializes_aliases() {
        let ecosystem: Ecosystem = serde_json::from_str("\"npm\"").unwrap();
        assert_eq!(ecosystem, Ecosystem::JavaScript);
        assert_eq!(serde_json::to_string(&Ecosystem::Python).unwrap(), "\"python\"");
    }

    #[test]
    fn test_python_names_are_normalized() {
        let a = PackageRef::new("Flask_SQLAlchemy", Ecosystem::Python);
        let b = PackageRef::new("flask-sqlalchemy", Ecosystem::Python);
        assert_eq!(a, b);
        assert_eq!(a.name(), "flask-sqlalchemy");
    }

    #[test]
    fn test_same_name_different_ecosystems_are_distinct() {
        let py = PackageRef::new("requests", Ecosystem::Python);
        let js = PackageRef::new("requests", Ecosystem::JavaScript);
        assert_ne!(py, js);
    }

    #[test]
    fn test_package_ref_display() {
        let pkg = PackageRef::new("left-pad", Ecosystem::JavaScript);
        assert_eq!(format!("{}", pkg), "javascript:left-pad");
    }
}
