use crate::application::dto::ScanRecords;
use crate::ports::outbound::RecordsReader;
use crate::shared::security::{read_bounded_file, MAX_INPUT_FILE_SIZE};
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// FileSystemRecordsReader adapter for reading a scan-records JSON document
///
/// This adapter implements the RecordsReader port. Symbolic links and
/// oversized files are refused before anything is parsed.
pub struct FileSystemRecordsReader;

impl FileSystemRecordsReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemRecordsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordsReader for FileSystemRecordsReader {
    fn read_records(&self, path: &Path) -> Result<ScanRecords> {
        if !path.exists() {
            anyhow::bail!(
                "Scan records not found: {}\n\n💡 Hint: Pass the JSON document produced by the scan collaborators with --input.",
                path.display()
            );
        }

        let content = read_bounded_file(path, "scan records", MAX_INPUT_FILE_SIZE)?;
        serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse scan records: {}\n\n💡 Hint: Expected a JSON object with optional \
                 'packages', 'imports', 'module_links', 'dependencies' and 'advisories' arrays.",
                path.display()
            )
        })
    }
}
