use std::fmt;

use evalgrid_core::{Category, EvaluationStore, ImportSummary, NewEvaluation, SheetRow};

use crate::config::ImportLayout;

/// Why a whole row was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRequired {
    pub email: Option<String>,
    pub name: Option<String>,
    pub week: Option<String>,
}

impl fmt::Display for MissingRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        write!(
            f,
            "required field missing (email: {}, name: {}, week: {})",
            show(&self.email),
            show(&self.name),
            show(&self.week)
        )
    }
}

/// Split one export row into per-category creation requests.
///
/// Respondent email, name and week are all required; without them the row
/// yields nothing. Each category is extracted independently and only when
/// both its evaluatee-name and content cells are filled, so a row produces
/// 0 to 4 requests.
pub fn extract_row(row: &SheetRow, layout: &ImportLayout) -> Result<Vec<NewEvaluation>, MissingRequired> {
    let r = &layout.respondent;
    let (email, name, week) = match (row.get(&r.email), row.get(&r.name), row.get(&r.week)) {
        (Some(email), Some(name), Some(week)) => (email, name, week),
        (email, name, week) => {
            return Err(MissingRequired {
                email: email.map(String::from),
                name: name.map(String::from),
                week: week.map(String::from),
            })
        }
    };

    let requests = Category::ALL
        .into_iter()
        .filter_map(|category| {
            let cols = layout.categories.get(category);
            let evaluatee = row.get(&cols.name)?;
            let content = row.get(&cols.content)?;
            Some(NewEvaluation {
                respondent_email: email.to_string(),
                respondent_name: name.to_string(),
                evaluatee_name: evaluatee.to_string(),
                category,
                week: week.to_string(),
                content: content.to_string(),
            })
        })
        .collect();
    Ok(requests)
}

/// Import evaluation export rows.
///
/// Partial-success: every sub-extraction is its own insert, and a failed row
/// or insert is counted and described (up to `max_error_samples`) without
/// affecting its siblings. `success_count` counts inserted records,
/// `error_count` counts skipped rows plus failed inserts.
pub fn import_evaluations<S: EvaluationStore + ?Sized>(
    store: &S,
    rows: &[SheetRow],
    layout: &ImportLayout,
    max_error_samples: usize,
) -> ImportSummary {
    let mut summary = ImportSummary::with_sample_cap(max_error_samples);
    summary.total_rows = rows.len();
    log::info!("importing {} evaluation rows", rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let line = idx + 1;
        let requests = match extract_row(row, layout) {
            Ok(requests) => requests,
            Err(missing) => {
                log::debug!("row {line} skipped: {missing}");
                summary.record_error(format!("row {line} skipped: {missing}"));
                continue;
            }
        };

        for request in &requests {
            match store.insert_evaluation(request) {
                Ok(_) => summary.record_success(),
                Err(e) => {
                    log::warn!("row {line} {}: insert failed: {e}", request.category);
                    summary.record_error(format!("row {line} {}: {e}", request.category));
                }
            }
        }
    }

    log::info!("evaluation import finished: {}", summary.summary());
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms_row(cells: &[(&str, &str)]) -> SheetRow {
        let mut row: SheetRow = [
            ("メール", "a@co.com"),
            ("名前", "Aoki"),
            ("実施週：週を選択してください", "W1"),
        ]
        .into_iter()
        .collect();
        for (h, v) in cells {
            row.insert(*h, *v);
        }
        row
    }

    #[test]
    fn single_category_yields_one_request() {
        let row = forms_row(&[("氏名", "Suzuky"), ("具体的な行動内容", "good job")]);
        let out = extract_row(&row, &ImportLayout::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::ValuePractice);
        assert_eq!(out[0].evaluatee_name, "Suzuky");
        assert_eq!(out[0].respondent_email, "a@co.com");
        assert_eq!(out[0].week, "W1");
    }

    #[test]
    fn all_four_categories() {
        let row = forms_row(&[
            ("氏名", "A"),
            ("具体的な行動内容", "a"),
            ("氏名2", "B"),
            ("具体的な行動内容2", "b"),
            ("氏名：", "C"),
            ("具体的な行動内容：", "c"),
            ("氏名3", "D"),
            ("具体的な行動内容3", "d"),
        ]);
        let out = extract_row(&row, &ImportLayout::default()).unwrap();
        let cats: Vec<Category> = out.iter().map(|r| r.category).collect();
        assert_eq!(cats, Category::ALL.to_vec());
        assert_eq!(out[2].evaluatee_name, "C");
        assert_eq!(out[2].content, "c");
    }

    #[test]
    fn half_filled_category_is_silently_skipped() {
        let row = forms_row(&[("氏名", "Suzuky"), ("具体的な行動内容3", "orphan content")]);
        assert!(extract_row(&row, &ImportLayout::default()).unwrap().is_empty());
    }

    #[test]
    fn missing_week_skips_whole_row() {
        let mut row: SheetRow = [("メール", "a@co.com"), ("名前", "Aoki")].into_iter().collect();
        row.insert("氏名", "Suzuky");
        row.insert("具体的な行動内容", "good job");

        let err = extract_row(&row, &ImportLayout::default()).unwrap_err();
        assert_eq!(err.week, None);
        assert_eq!(
            err.to_string(),
            "required field missing (email: a@co.com, name: Aoki, week: -)"
        );
    }

    #[test]
    fn names_are_not_normalized() {
        let row = forms_row(&[("氏名", " suzuki "), ("具体的な行動内容", "x")]);
        let out = extract_row(&row, &ImportLayout::default()).unwrap();
        assert_eq!(out[0].evaluatee_name, " suzuki ");
    }
}
