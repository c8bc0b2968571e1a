//! `fleetsync-recon` - two-source record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded record sets, returns merged,
//! filtered and enriched records plus a run summary.
//! No CLI, network or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod similarity;
pub mod summary;
pub mod value;

pub use config::{MergeConfig, PipelineConfig, ReconConfig};
pub use engine::run;
pub use error::ReconError;
pub use model::{PipelineOutput, Record, RecordSet, RunMeta, RunSummary};
pub use pipeline::{LabelLookup, LookupError};
pub use reconcile::{Reconciler, Resolution};
