use std::path::Path;
use vuln_impact::prelude::*;

/// Mock RecordsReader returning canned records regardless of path
pub struct MockRecordsReader {
    records: ScanRecords,
}

impl MockRecordsReader {
    pub fn new(records: ScanRecords) -> Self {
        Self { records }
    }
}

impl RecordsReader for MockRecordsReader {
    fn read_records(&self, _path: &Path) -> Result<ScanRecords> {
        Ok(self.records.clone())
    }
}
