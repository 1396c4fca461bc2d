// src/jobs/mod.rs
pub mod backend;
pub mod export;
pub mod model;
pub mod tracker;

pub use backend::{JobsBackend, RestJobsBackend};
pub use export::{export_csv, export_csv_string, parse_import_csv, ImportBatch};
pub use model::{Job, JobDetails, JobPatch, JobStatus, NewJob, TimelineEntry};
pub use tracker::{JobStats, JobTracker};
