use crate::application::dto::AnalysisReport;
use crate::shared::Result;

/// ReportPresenter port for delivering the structured analysis report
/// (stdout, file, etc.). Rendering beyond JSON is a caller concern.
pub trait ReportPresenter {
    /// # Errors
    /// Returns an error if serialization or writing to the destination fails.
    fn present(&self, report: &AnalysisReport) -> Result<()>;
}
