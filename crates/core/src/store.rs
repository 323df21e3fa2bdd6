use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::evaluation::{
    EvaluationRecord, EvaluationSettings, NameValidity, NewEvaluation, ReceivedFilter,
};
use crate::registry::{NameMapping, Participant};
use crate::summary::{CorrectionStats, Overview};

/// Persistence contract for evaluations, the participant registry, and name mappings.
///
/// Implementations are passed by reference into every operation; there is no
/// ambient connection. Each method is one logical storage operation: callers
/// decide how failures of individual calls affect a batch.
pub trait EvaluationStore {
    // -- evaluations --------------------------------------------------------

    /// Insert a new record with validity Unknown. Returns its id.
    fn insert_evaluation(&self, new: &NewEvaluation) -> Result<i64, StoreError>;

    fn evaluation(&self, id: i64) -> Result<Option<EvaluationRecord>, StoreError>;

    /// Records still in the Unknown state, oldest first.
    fn unvalidated_evaluations(&self) -> Result<Vec<EvaluationRecord>, StoreError>;

    /// Decide a record's name validity, optionally rewriting its evaluatee name.
    ///
    /// Applies only while the record is still Unknown; returns `false` when
    /// another pass got there first. `Invalid` also raises the correction flag.
    fn record_name_validity(
        &self,
        id: i64,
        validity: NameValidity,
        rewritten_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Atomically replace the evaluatee name of a record owned by `respondent_email`.
    ///
    /// Snapshots the previous name into `original_evaluatee_name` on first
    /// correction, marks the name Valid and clears the correction flag.
    /// Returns `None` when no such owned record exists.
    fn apply_name_correction(
        &self,
        id: i64,
        respondent_email: &str,
        corrected_name: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<EvaluationRecord>, StoreError>;

    /// Owner edit of content/visibility. Never touches name-validity fields.
    /// Returns `false` when no such owned record exists.
    fn update_settings(
        &self,
        id: i64,
        respondent_email: &str,
        settings: &EvaluationSettings,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// All records by a respondent, newest week first.
    fn evaluations_by_respondent(&self, respondent_email: &str) -> Result<Vec<EvaluationRecord>, StoreError>;

    fn evaluations_needing_correction(&self, respondent_email: &str) -> Result<Vec<EvaluationRecord>, StoreError>;

    /// Non-hidden records addressed to `evaluatee_name`, newest week first.
    fn received_evaluations(
        &self,
        evaluatee_name: &str,
        filter: &ReceivedFilter,
    ) -> Result<Vec<EvaluationRecord>, StoreError>;

    fn correction_stats(&self, respondent_email: &str) -> Result<CorrectionStats, StoreError>;

    /// Distinct week labels, descending.
    fn weeks(&self) -> Result<Vec<String>, StoreError>;

    fn overview(&self) -> Result<Overview, StoreError>;

    // -- registry -----------------------------------------------------------

    /// Insert or replace by `official_name`.
    fn upsert_participant(&self, participant: &Participant) -> Result<(), StoreError>;

    fn participant_exists(&self, official_name: &str) -> Result<bool, StoreError>;

    fn participants(&self) -> Result<Vec<Participant>, StoreError>;

    // -- name mappings ------------------------------------------------------

    /// Insert or replace by `variant_name`.
    fn put_name_mapping(&self, mapping: &NameMapping) -> Result<(), StoreError>;

    fn name_mappings(&self) -> Result<Vec<NameMapping>, StoreError>;
}
