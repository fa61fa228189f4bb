use super::error::ImpactError;

/// Type alias for Result with anyhow::Error as the error type.
/// Used at the application edges (configuration, file I/O, CLI).
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Result type for engine operations, keeping the error kind matchable
/// so retry policy can live with the caller.
pub type EngineResult<T> = std::result::Result<T, ImpactError>;
