/// Data Transfer Objects for application layer
///
/// DTOs carry collaborator input into the use cases and the structured
/// analysis result out to the presenters.
mod analysis_report;
mod analysis_request;
mod scan_records;

pub use analysis_report::{AnalysisReport, BuildSummary, UnresolvedSeed};
pub use analysis_request::{AnalysisRequest, DEFAULT_MAX_CONCURRENCY};
pub use scan_records::{PackageAdvisories, ScanRecords};
