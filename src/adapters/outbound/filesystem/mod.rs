/// Filesystem adapters for reading scan records and writing reports
mod file_reader;
mod file_writer;

pub use file_reader::FileSystemRecordsReader;
pub use file_writer::{FileSystemWriter, StdoutPresenter};
