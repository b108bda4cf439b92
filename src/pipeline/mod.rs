// Cleaning pipeline: ingestion, processing, reporting and storage

pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod report;
pub mod storage;

pub use orchestrator::{CleanedTable, CleaningOptions, CleaningPipeline};
pub use report::CleaningReport;
