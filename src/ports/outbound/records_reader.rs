use crate::application::dto::ScanRecords;
use crate::shared::Result;
use std::path::Path;

/// RecordsReader port for loading collaborator output.
///
/// Manifest parsing, import extraction and advisory fetching happen outside
/// the engine; their normalized records arrive as one scan-records document.
pub trait RecordsReader {
    /// Reads and deserializes the scan records at `path`
    ///
    /// # Errors
    /// Returns an error if the file is missing, unsafe to read (symlink,
    /// oversized) or not a valid scan-records document.
    fn read_records(&self, path: &Path) -> Result<ScanRecords>;
}
