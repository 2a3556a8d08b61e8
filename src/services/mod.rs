pub mod aggregator;
pub mod analytics;
pub mod normalizer;
pub mod reconciler;
pub mod report;
pub mod snapshot;
pub mod tracker;

pub use aggregator::summarize;
pub use normalizer::normalize;
pub use reconciler::reconcile;
pub use report::{JsonReportWriter, ReportSink, TracingReportSink};
pub use snapshot::{collect_snapshot, HttpSnapshotFetcher, Snapshot, SnapshotFetcher};
pub use tracker::{CycleSummary, Tracker};
