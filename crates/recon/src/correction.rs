use chrono::Utc;

use evalgrid_core::{CorrectionStats, EvalError, EvaluationRecord, EvaluationStore};

/// Replace the evaluatee name of a record owned by `submitter_email`.
///
/// The trimmed name must be an official registry name. Absent and foreign
/// records fail the same way. On success the record is Valid, unflagged,
/// and remembers the name it had before its first correction.
pub fn correct_name<S: EvaluationStore + ?Sized>(
    store: &S,
    evaluation_id: i64,
    submitter_email: &str,
    corrected_name: &str,
) -> Result<EvaluationRecord, EvalError> {
    let corrected_name = corrected_name.trim();
    if corrected_name.is_empty() {
        return Err(EvalError::validation("corrected name is required"));
    }

    match store.evaluation(evaluation_id)? {
        Some(record) if record.respondent_email == submitter_email => {}
        _ => {
            log::debug!("correction of {evaluation_id} by {submitter_email} rejected: not found or not owned");
            return Err(EvalError::NotFoundOrForbidden);
        }
    }

    if !store.participant_exists(corrected_name)? {
        log::debug!("correction of {evaluation_id} rejected: '{corrected_name}' not registered");
        return Err(EvalError::validation("corrected name not found in participant list"));
    }

    let record = store
        .apply_name_correction(evaluation_id, submitter_email, corrected_name, Utc::now())?
        .ok_or(EvalError::NotFoundOrForbidden)?;

    log::info!(
        "evaluation {evaluation_id}: evaluatee corrected to '{}' (was '{}')",
        record.evaluatee_name,
        record.original_evaluatee_name.as_deref().unwrap_or_default()
    );
    Ok(record)
}

/// Records by `submitter_email` still flagged for correction.
pub fn list_needing_correction<S: EvaluationStore + ?Sized>(
    store: &S,
    submitter_email: &str,
) -> Result<Vec<EvaluationRecord>, EvalError> {
    Ok(store.evaluations_needing_correction(submitter_email)?)
}

/// Counters over the submitter's records, read from current state.
pub fn correction_stats<S: EvaluationStore + ?Sized>(
    store: &S,
    submitter_email: &str,
) -> Result<CorrectionStats, EvalError> {
    Ok(store.correction_stats(submitter_email)?)
}
