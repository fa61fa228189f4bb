pub mod annotation;
pub mod graph;
pub mod impact_set;
pub mod package;
pub mod records;
pub mod risk_report;
pub mod version;
pub mod vulnerability;

pub use annotation::{AnnotationBatch, AnnotationResult, RejectedRecord};
pub use graph::{
    Direction, Edge, EdgeKey, EdgeKind, GraphStats, Node, NodeKey, PackageNode, UpsertOutcome,
    VulnerabilityNode,
};
pub use impact_set::{ImpactSet, ImpactedFile, ImpactedModule, ImpactedPackage, TraversalSeed};
pub use package::{Ecosystem, PackageRef};
pub use records::{DependencyRecord, ImportRecord, ModuleLinkRecord, PackageRecord};
pub use risk_report::{RankedVulnerability, Remediation, RiskReport};
pub use version::{Comparator, ParsedVersion, VersionRange};
pub use vulnerability::{Severity, VulnerabilityRecord};
