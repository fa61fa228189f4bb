use crate::application::dto::AnalysisReport;
use crate::ports::outbound::ReportPresenter;
use crate::shared::security::validate_output_path;
use crate::shared::Result;
use anyhow::Context;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

fn render(report: &AnalysisReport) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(report).context("Failed to serialize analysis report")?;
    json.push('\n');
    Ok(json)
}

/// FileSystemWriter adapter for writing the report to a file
///
/// This adapter implements the ReportPresenter port for file output.
pub struct FileSystemWriter {
    output_path: PathBuf,
}

impl FileSystemWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

impl ReportPresenter for FileSystemWriter {
    fn present(&self, report: &AnalysisReport) -> Result<()> {
        validate_output_path(&self.output_path)?;
        let content = render(report)?;

        fs::write(&self.output_path, content).with_context(|| {
            format!("Failed to write report to {}", self.output_path.display())
        })?;

        tracing::info!(path = %self.output_path.display(), "Report written");
        Ok(())
    }
}

/// StdoutPresenter adapter for writing the report to stdout
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPresenter for StdoutPresenter {
    fn present(&self, report: &AnalysisReport) -> Result<()> {
        let content = render(report)?;
        io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to write to stdout: {}", e))?;
        Ok(())
    }
}
