/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the engine uses to reach the
/// graph store, collaborator records and the console.
pub mod graph_store;
pub mod progress_reporter;
pub mod records_reader;
pub mod report_presenter;

pub use graph_store::GraphStore;
pub use progress_reporter::{ProgressReporter, SilentProgressReporter};
pub use records_reader::RecordsReader;
pub use report_presenter::ReportPresenter;
