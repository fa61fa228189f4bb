/// Mock implementations for testing
mod mock_graph_store;
mod mock_progress_reporter;
mod mock_records_reader;

pub use mock_graph_store::FailingGraphStore;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_records_reader::MockRecordsReader;
