use evalgrid_core::{EvalError, EvaluationStore, ImportSummary, NameMapping, Participant, SheetRow};

use crate::config::ParticipantColumns;

/// Official name (first matching header, else the leftmost cell) and optional email.
pub fn extract_participant(row: &SheetRow, cols: &ParticipantColumns) -> Option<Participant> {
    let official_name = row.first_of(&cols.name).or_else(|| {
        if cols.fallback_first_cell {
            row.first_value()
        } else {
            None
        }
    })?;

    Some(Participant {
        official_name: official_name.to_string(),
        email: row.first_of(&cols.email).map(String::from),
    })
}

/// Upsert participant rows into the registry, keyed by official name.
///
/// A later row (or later import) with the same name replaces the email.
pub fn import_participants<S: EvaluationStore + ?Sized>(
    store: &S,
    rows: &[SheetRow],
    cols: &ParticipantColumns,
    max_error_samples: usize,
) -> ImportSummary {
    let mut summary = ImportSummary::with_sample_cap(max_error_samples);
    summary.total_rows = rows.len();
    log::info!("importing {} participant rows", rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 1;
        let Some(participant) = extract_participant(row, cols) else {
            summary.record_error(format!("row {line} skipped: no participant name"));
            continue;
        };
        match store.upsert_participant(&participant) {
            Ok(()) => summary.record_success(),
            Err(e) => {
                log::warn!("row {line}: participant '{}' not saved: {e}", participant.official_name);
                summary.record_error(format!("row {line}: {e}"));
            }
        }
    }

    log::info!("participant import finished: {}", summary.summary());
    summary
}

/// Register `variant_name` as an alias of `official_name`.
///
/// The target is not required to exist in the registry; see
/// `Reconciler::strict_mappings` for enforcement at reconciliation time.
pub fn put_mapping<S: EvaluationStore + ?Sized>(
    store: &S,
    variant_name: &str,
    official_name: &str,
) -> Result<NameMapping, EvalError> {
    if variant_name.is_empty() || official_name.trim().is_empty() {
        return Err(EvalError::validation("variant and official names are required"));
    }
    if variant_name == official_name {
        return Err(EvalError::validation("a name cannot map to itself"));
    }
    let mapping = NameMapping {
        variant_name: variant_name.to_string(),
        official_name: official_name.trim().to_string(),
    };
    store.put_name_mapping(&mapping)?;
    log::info!("mapped '{}' -> '{}'", mapping.variant_name, mapping.official_name);
    Ok(mapping)
}

pub fn list_mappings<S: EvaluationStore + ?Sized>(store: &S) -> Result<Vec<NameMapping>, EvalError> {
    Ok(store.name_mappings()?)
}

pub fn list_participants<S: EvaluationStore + ?Sized>(store: &S) -> Result<Vec<Participant>, EvalError> {
    Ok(store.participants()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_name_column_preferred() {
        let row: SheetRow = [("氏名", "すずき"), ("正式氏名", "鈴木 一郎"), ("メール", "s@co.com")]
            .into_iter()
            .collect();
        let p = extract_participant(&row, &ParticipantColumns::default()).unwrap();
        assert_eq!(p.official_name, "鈴木 一郎");
        assert_eq!(p.email.as_deref(), Some("s@co.com"));
    }

    #[test]
    fn email_address_column_preferred() {
        let row: SheetRow = [("氏名", "Sato"), ("メール", "old@co.com"), ("メールアドレス", "new@co.com")]
            .into_iter()
            .collect();
        let p = extract_participant(&row, &ParticipantColumns::default()).unwrap();
        assert_eq!(p.email.as_deref(), Some("new@co.com"));
    }

    #[test]
    fn falls_back_to_first_cell() {
        let row: SheetRow = [("Employee", "Tanaka"), ("Dept", "Sales")].into_iter().collect();
        let p = extract_participant(&row, &ParticipantColumns::default()).unwrap();
        assert_eq!(p.official_name, "Tanaka");
        assert_eq!(p.email, None);

        let strict = ParticipantColumns { fallback_first_cell: false, ..Default::default() };
        assert!(extract_participant(&row, &strict).is_none());
    }

    #[test]
    fn empty_row_has_no_participant() {
        assert!(extract_participant(&SheetRow::new(), &ParticipantColumns::default()).is_none());
    }
}
