//! `evalgrid-recon`: evaluation ingestion and evaluatee-name reconciliation.
//!
//! Pure service crate: every operation takes an injected `EvaluationStore`
//! and decoded `SheetRow`s. No file or database IO of its own.

pub mod config;
pub mod correction;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod matcher;
pub mod registry;
pub mod views;

pub use config::ImportLayout;
pub use correction::{correct_name, correction_stats, list_needing_correction};
pub use engine::{reconcile_names, Reconciler};
pub use error::ConfigError;
pub use ingest::import_evaluations;
pub use registry::import_participants;
