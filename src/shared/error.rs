use std::fmt;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - no vulnerabilities at or above the fail threshold
    Success = 0,
    /// Vulnerabilities at or above the configured threshold impact the scanned files
    VulnerabilitiesDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (unreadable input, store failure, bad configuration, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::VulnerabilitiesDetected => write!(f, "Vulnerabilities Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Kind of graph node an identifier refers to, used in `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Module,
    Package,
    Vulnerability,
    AffectedVersion,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::File => "File",
            NodeKind::Module => "Module",
            NodeKind::Package => "Package",
            NodeKind::Vulnerability => "Vulnerability",
            NodeKind::AffectedVersion => "AffectedVersion",
        };
        f.write_str(label)
    }
}

/// Errors produced by the impact graph engine.
///
/// Each variant maps to a distinct handling policy:
/// - `InvalidVersion` is absorbed by the version matcher (fails closed)
/// - `UpstreamDataError` rejects a single record, the batch continues
/// - `NotFound` is reportable; the caller decides whether to skip or abort
/// - `StoreUnavailable` is transient and safe to retry
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImpactError {
    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Rejected vulnerability record '{cve_id}': {reason}")]
    UpstreamDataError { cve_id: String, reason: String },

    #[error("{kind} not found in graph: {key}")]
    NotFound { kind: NodeKind, key: String },

    #[error("Graph store unavailable during {operation}: {details}\n\n💡 Hint: The operation is idempotent and can be retried")]
    StoreUnavailable { operation: String, details: String },
}

impl ImpactError {
    /// Returns true when the failed operation can be retried as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImpactError::StoreUnavailable { .. })
    }

    pub(crate) fn invalid_version(input: &str, reason: impl Into<String>) -> Self {
        ImpactError::InvalidVersion {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: NodeKind, key: impl fmt::Display) -> Self {
        ImpactError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn store_unavailable(operation: &str, details: impl Into<String>) -> Self {
        ImpactError::StoreUnavailable {
            operation: operation.to_string(),
            details: details.into(),
        }
    }
}
