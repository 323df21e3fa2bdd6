//! `evalgrid-core`: shared types for peer evaluations.
//!
//! Data model, error taxonomy, and the `EvaluationStore` contract.
//! No IO: storage engines implement the trait in other crates.

pub mod error;
pub mod evaluation;
pub mod registry;
pub mod row;
pub mod store;
pub mod summary;

pub use error::{EvalError, StoreError, StoreErrorKind};
pub use evaluation::{
    Category, EvaluationRecord, EvaluationSettings, NameValidity, NewEvaluation,
    ReceivedEvaluation, ReceivedFilter,
};
pub use registry::{NameMapping, Participant};
pub use row::SheetRow;
pub use store::EvaluationStore;
pub use summary::{
    CorrectionStats, ImportSummary, Overview, ReconcileOutcome, DEFAULT_MAX_ERROR_SAMPLES,
    DEFAULT_MAX_UPLOAD_BYTES,
};
