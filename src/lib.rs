//! vuln-impact - vulnerability impact graph engine
//!
//! This library maintains a labeled property graph of source files, imported
//! modules, packages and vulnerabilities, and computes for a vulnerability or
//! package the set of files transitively exposed to it, together with a
//! ranked remediation list.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`impact_analysis`): graph model, version matching and
//!   risk aggregation as pure code
//! - **Application Layer** (`application`): graph builder, vulnerability
//!   annotator, impact traversal and the analysis orchestration
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use vuln_impact::prelude::*;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! let store = Arc::new(InMemoryGraphStore::new());
//! let use_case = AnalyzeScanUseCase::new(
//!     FileSystemRecordsReader::new(),
//!     StderrProgressReporter::new(),
//!     store,
//! );
//!
//! let report = use_case
//!     .execute(AnalysisRequest::new(PathBuf::from("scan.json")))
//!     .await?;
//! StdoutPresenter::new().present(&report)?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod impact_analysis;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemRecordsReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::memory::{InMemoryGraphStore, TimeoutGraphStore};
    pub use crate::application::dto::{AnalysisReport, AnalysisRequest, ScanRecords};
    pub use crate::application::use_cases::{
        AnalyzeScanUseCase, CancellationSignal, GraphBuilder, ImpactTraversalEngine,
        VulnerabilityAnnotator,
    };
    pub use crate::impact_analysis::domain::{
        AnnotationResult, Ecosystem, ImpactSet, PackageRef, RiskReport, Severity,
        TraversalSeed, VulnerabilityRecord,
    };
    pub use crate::impact_analysis::services::{
        MatchOutcome, RemediationPlanner, RiskAggregator, VersionMatcher,
    };
    pub use crate::ports::inbound::ImpactQueryPort;
    pub use crate::ports::outbound::{
        GraphStore, ProgressReporter, RecordsReader, ReportPresenter,
    };
    pub use crate::shared::error::ImpactError;
    pub use crate::shared::{EngineResult, Result};
}
