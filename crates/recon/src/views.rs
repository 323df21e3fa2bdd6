// Read views and owner edits around stored evaluations

use chrono::Utc;
use serde::Serialize;

use evalgrid_core::{
    Category, EvalError, EvaluationRecord, EvaluationSettings, EvaluationStore, Overview,
    ReceivedEvaluation, ReceivedFilter,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub key: &'static str,
    pub name: &'static str,
}

pub fn categories() -> Vec<CategoryInfo> {
    Category::ALL
        .into_iter()
        .map(|c| CategoryInfo { key: c.key(), name: c.label() })
        .collect()
}

/// Visible evaluations addressed to `evaluatee_name`, anonymized where requested.
pub fn list_received<S: EvaluationStore + ?Sized>(
    store: &S,
    evaluatee_name: &str,
    filter: &ReceivedFilter,
    anonymous_label: &str,
) -> Result<Vec<ReceivedEvaluation>, EvalError> {
    let records = store.received_evaluations(evaluatee_name, filter)?;
    Ok(records
        .iter()
        .map(|r| ReceivedEvaluation::from_record(r, anonymous_label))
        .collect())
}

pub fn list_given<S: EvaluationStore + ?Sized>(
    store: &S,
    respondent_email: &str,
) -> Result<Vec<EvaluationRecord>, EvalError> {
    Ok(store.evaluations_by_respondent(respondent_email)?)
}

/// Owner edit of content, anonymity and visibility.
///
/// Name-validity fields are never touched here.
pub fn update_settings<S: EvaluationStore + ?Sized>(
    store: &S,
    evaluation_id: i64,
    respondent_email: &str,
    settings: &EvaluationSettings,
) -> Result<EvaluationRecord, EvalError> {
    if settings.is_empty() {
        return Err(EvalError::validation("no settings to update"));
    }
    if matches!(settings.content.as_deref(), Some(c) if c.trim().is_empty()) {
        return Err(EvalError::validation("evaluation content cannot be empty"));
    }

    if !store.update_settings(evaluation_id, respondent_email, settings, Utc::now())? {
        return Err(EvalError::NotFoundOrForbidden);
    }
    store.evaluation(evaluation_id)?.ok_or(EvalError::NotFoundOrForbidden)
}

pub fn list_weeks<S: EvaluationStore + ?Sized>(store: &S) -> Result<Vec<String>, EvalError> {
    Ok(store.weeks()?)
}

pub fn overview<S: EvaluationStore + ?Sized>(store: &S) -> Result<Overview, EvalError> {
    Ok(store.overview()?)
}
