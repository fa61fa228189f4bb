//! Labeled property graph model: node keys, node payloads and typed edges.

use super::package::PackageRef;
use super::vulnerability::{Severity, VulnerabilityRecord};
use crate::shared::error::NodeKind;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a node. Two nodes with equal keys are the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum NodeKey {
    File { path: String },
    Module { name: String },
    Package(PackageRef),
    Vulnerability { cve_id: String },
    AffectedVersion { cve_id: String, range: String },
}

impl NodeKey {
    pub fn file(path: &str) -> Self {
        NodeKey::File {
            path: path.to_string(),
        }
    }

    pub fn module(name: &str) -> Self {
        NodeKey::Module {
            name: name.to_string(),
        }
    }

    pub fn package(package: &PackageRef) -> Self {
        NodeKey::Package(package.clone())
    }

    pub fn vulnerability(cve_id: &str) -> Self {
        NodeKey::Vulnerability {
            cve_id: cve_id.to_string(),
        }
    }

    pub fn affected_version(cve_id: &str, range: &str) -> Self {
        NodeKey::AffectedVersion {
            cve_id: cve_id.to_string(),
            range: range.to_string(),
        }
    }

    /// The identifying value without the label, e.g. a path or cve_id
    pub fn identifier(&self) -> String {
        match self {
            NodeKey::File { path } => path.clone(),
            NodeKey::Module { name } => name.clone(),
            NodeKey::Package(package) => package.to_string(),
            NodeKey::Vulnerability { cve_id } => cve_id.clone(),
            NodeKey::AffectedVersion { cve_id, range } => format!("{} {}", cve_id, range),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeKey::File { .. } => NodeKind::File,
            NodeKey::Module { .. } => NodeKind::Module,
            NodeKey::Package(_) => NodeKind::Package,
            NodeKey::Vulnerability { .. } => NodeKind::Vulnerability,
            NodeKey::AffectedVersion { .. } => NodeKind::AffectedVersion,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::File { path } => write!(f, "File({})", path),
            NodeKey::Module { name } => write!(f, "Module({})", name),
            NodeKey::Package(package) => write!(f, "Package({})", package),
            NodeKey::Vulnerability { cve_id } => write!(f, "Vulnerability({})", cve_id),
            NodeKey::AffectedVersion { cve_id, range } => {
                write!(f, "AffectedVersion({} {})", cve_id, range)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageNode {
    pub package: PackageRef,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerabilityNode {
    pub cve_id: String,
    pub severity: Severity,
    pub description: String,
    pub cvss_score: f64,
    pub published_date: Option<NaiveDate>,
}

impl From<&VulnerabilityRecord> for VulnerabilityNode {
    fn from(record: &VulnerabilityRecord) -> Self {
        Self {
            cve_id: record.cve_id.trim().to_string(),
            severity: record.severity,
            description: record.description.clone(),
            cvss_score: record.cvss_score,
            published_date: record.published_date,
        }
    }
}

/// A node with its properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum Node {
    File { path: String },
    Module { name: String },
    Package(PackageNode),
    Vulnerability(VulnerabilityNode),
    AffectedVersion { cve_id: String, range: String },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::File { path } => NodeKey::file(path),
            Node::Module { name } => NodeKey::module(name),
            Node::Package(node) => NodeKey::package(&node.package),
            Node::Vulnerability(node) => NodeKey::vulnerability(&node.cve_id),
            Node::AffectedVersion { cve_id, range } => NodeKey::affected_version(cve_id, range),
        }
    }

    /// Merges an incoming node with the same key into this one.
    ///
    /// - Package: a known incoming version replaces the stored one; an
    ///   absent incoming version never erases a known one.
    /// - Vulnerability: every mutable property is last-write-wins.
    /// - Other labels carry no mutable properties.
    ///
    /// Returns whether anything changed.
    pub fn merge(&mut self, incoming: Node) -> bool {
        match (self, incoming) {
            (Node::Package(current), Node::Package(incoming)) => match incoming.version {
                Some(version) if current.version.as_deref() != Some(version.as_str()) => {
                    current.version = Some(version);
                    true
                }
                _ => false,
            },
            (Node::Vulnerability(current), Node::Vulnerability(incoming)) => {
                if *current == incoming {
                    false
                } else {
                    *current = incoming;
                    true
                }
            }
            _ => false,
        }
    }

    pub fn as_package(&self) -> Option<&PackageNode> {
        match self {
            Node::Package(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_vulnerability(&self) -> Option<&VulnerabilityNode> {
        match self {
            Node::Vulnerability(node) => Some(node),
            _ => None,
        }
    }
}

/// Relationship labels. Each label fixes the node kinds at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// File -> Module
    Imports,
    /// Module -> Package
    ResolvesTo,
    /// Package -> Package
    DependsOn,
    /// Package -> Vulnerability
    AffectedBy,
    /// Vulnerability -> AffectedVersion
    Affects,
}

impl EdgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::ResolvesTo => "RESOLVES_TO",
            EdgeKind::DependsOn => "DEPENDS_ON",
            EdgeKind::AffectedBy => "AFFECTED_BY",
            EdgeKind::Affects => "AFFECTS",
        }
    }

    pub fn endpoints(&self) -> (NodeKind, NodeKind) {
        match self {
            EdgeKind::Imports => (NodeKind::File, NodeKind::Module),
            EdgeKind::ResolvesTo => (NodeKind::Module, NodeKind::Package),
            EdgeKind::DependsOn => (NodeKind::Package, NodeKind::Package),
            EdgeKind::AffectedBy => (NodeKind::Package, NodeKind::Vulnerability),
            EdgeKind::Affects => (NodeKind::Vulnerability, NodeKind::AffectedVersion),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of an edge: at most one edge per `(from, kind, to)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: NodeKey,
    pub kind: EdgeKind,
    pub to: NodeKey,
}

/// A typed edge. Construct through the label-specific constructors so the
/// endpoint kinds always agree with the label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    from: NodeKey,
    kind: EdgeKind,
    to: NodeKey,
    /// AFFECTED_BY only: created without a resolved package version
    unresolved_version: bool,
    /// AFFECTED_BY only: the range expressions the package version matched
    matched_ranges: Vec<String>,
}

impl Edge {
    fn new(from: NodeKey, kind: EdgeKind, to: NodeKey) -> Self {
        debug_assert_eq!((from.kind(), to.kind()), kind.endpoints());
        Self {
            from,
            kind,
            to,
            unresolved_version: false,
            matched_ranges: Vec::new(),
        }
    }

    pub fn imports(file_path: &str, module_name: &str) -> Self {
        Self::new(
            NodeKey::file(file_path),
            EdgeKind::Imports,
            NodeKey::module(module_name),
        )
    }

    pub fn resolves_to(module_name: &str, package: &PackageRef) -> Self {
        Self::new(
            NodeKey::module(module_name),
            EdgeKind::ResolvesTo,
            NodeKey::package(package),
        )
    }

    pub fn depends_on(dependent: &PackageRef, dependency: &PackageRef) -> Self {
        Self::new(
            NodeKey::package(dependent),
            EdgeKind::DependsOn,
            NodeKey::package(dependency),
        )
    }

    /// AFFECTED_BY edge backed by the ranges the package version matched
    pub fn affected_by(package: &PackageRef, cve_id: &str, matched_ranges: Vec<String>) -> Self {
        let mut edge = Self::new(
            NodeKey::package(package),
            EdgeKind::AffectedBy,
            NodeKey::vulnerability(cve_id),
        );
        edge.matched_ranges = matched_ranges;
        edge
    }

    /// AFFECTED_BY edge created conservatively because the package has no pinned version
    pub fn affected_by_unresolved(package: &PackageRef, cve_id: &str) -> Self {
        let mut edge = Self::new(
            NodeKey::package(package),
            EdgeKind::AffectedBy,
            NodeKey::vulnerability(cve_id),
        );
        edge.unresolved_version = true;
        edge
    }

    pub fn affects(cve_id: &str, range: &str) -> Self {
        Self::new(
            NodeKey::vulnerability(cve_id),
            EdgeKind::Affects,
            NodeKey::affected_version(cve_id, range),
        )
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            from: self.from.clone(),
            kind: self.kind,
            to: self.to.clone(),
        }
    }

    pub fn from(&self) -> &NodeKey {
        &self.from
    }

    pub fn to(&self) -> &NodeKey {
        &self.to
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn is_unresolved_version(&self) -> bool {
        self.unresolved_version
    }

    pub fn matched_ranges(&self) -> &[String] {
        &self.matched_ranges
    }
}

/// Direction of a one-hop traversal relative to the edge orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Result of an idempotent upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Node and edge counts, broken down by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: BTreeMap<String, usize>,
    pub edges: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn node_count(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().sum()
    }

    pub fn nodes_labeled(&self, kind: NodeKind) -> usize {
        self.nodes.get(&kind.to_string()).copied().unwrap_or(0)
    }

    pub fn edges_labeled(&self, kind: EdgeKind) -> usize {
        self.edges.get(kind.label()).copied().unwrap_or(0)
    }
}
