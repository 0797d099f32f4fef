pub mod export;

pub use export::{ExportJobHandle, ExportSink, LoggingExportSink};
