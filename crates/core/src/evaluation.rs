use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Fixed evaluation categories. Keys are stable; labels are for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ValuePractice,
    PrinciplePractice,
    Contribution,
    ValuePromotion,
}

impl Category {
    /// All categories in form order.
    pub const ALL: [Category; 4] = [
        Category::ValuePractice,
        Category::PrinciplePractice,
        Category::Contribution,
        Category::ValuePromotion,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::ValuePractice => "value_practice",
            Self::PrinciplePractice => "principle_practice",
            Self::Contribution => "contribution",
            Self::ValuePromotion => "value_promotion",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ValuePractice => "3つのバリューの実践",
            Self::PrinciplePractice => "プリンシプルの実践",
            Self::Contribution => "プロジェクトメンバー評価（貢献度）",
            Self::ValuePromotion => "プロジェクトメンバー評価（バリュー実践）",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown category: \"{s}\""))
    }
}

// ---------------------------------------------------------------------------
// Name validity
// ---------------------------------------------------------------------------

/// Reconciliation state of an evaluatee name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameValidity {
    /// Not yet processed by reconciliation.
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl NameValidity {
    /// Storage representation: nullable boolean.
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Unknown,
            Some(true) => Self::Valid,
            Some(false) => Self::Invalid,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Valid => Some(true),
            Self::Invalid => Some(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored peer evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: i64,
    pub respondent_email: String,
    pub respondent_name: String,
    pub evaluatee_name: String,
    /// Evaluatee name as it was before the first correction.
    pub original_evaluatee_name: Option<String>,
    pub category: Category,
    pub week: String,
    pub content: String,
    pub is_anonymous: bool,
    pub is_hidden: bool,
    pub name_validity: NameValidity,
    pub needs_name_correction: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRecord {
    /// `needs_name_correction` implies an invalid name.
    pub fn is_consistent(&self) -> bool {
        !self.needs_name_correction || self.name_validity == NameValidity::Invalid
    }
}

/// Creation request produced by ingestion. Validity always starts Unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvaluation {
    pub respondent_email: String,
    pub respondent_name: String,
    pub evaluatee_name: String,
    pub category: Category,
    pub week: String,
    pub content: String,
}

/// Owner-editable fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EvaluationSettings {
    pub content: Option<String>,
    pub is_anonymous: Option<bool>,
    pub is_hidden: Option<bool>,
}

impl EvaluationSettings {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.is_anonymous.is_none() && self.is_hidden.is_none()
    }
}

/// A record as shown to its evaluatee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceivedEvaluation {
    pub id: i64,
    pub display_name: String,
    pub week: String,
    pub category: Category,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl ReceivedEvaluation {
    pub fn from_record(record: &EvaluationRecord, anonymous_label: &str) -> Self {
        let display_name = if record.is_anonymous {
            anonymous_label.to_string()
        } else {
            record.respondent_name.clone()
        };
        Self {
            id: record.id,
            display_name,
            week: record.week.clone(),
            category: record.category,
            content: record.content.clone(),
            is_anonymous: record.is_anonymous,
            created_at: record.created_at,
        }
    }
}

/// Optional narrowing for received evaluations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedFilter {
    pub category: Option<Category>,
    pub week: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_keys_round_trip() {
        for c in Category::ALL {
            assert_eq!(c.key().parse::<Category>().unwrap(), c);
        }
        assert!("values".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_key() {
        let json = serde_json::to_string(&Category::PrinciplePractice).unwrap();
        assert_eq!(json, "\"principle_practice\"");
    }

    #[test]
    fn validity_flag_mapping() {
        assert_eq!(NameValidity::from_flag(None), NameValidity::Unknown);
        assert_eq!(NameValidity::from_flag(Some(true)), NameValidity::Valid);
        assert_eq!(NameValidity::from_flag(Some(false)), NameValidity::Invalid);
        assert_eq!(NameValidity::Invalid.as_flag(), Some(false));
        assert_eq!(NameValidity::Unknown.as_flag(), None);
    }

    #[test]
    fn received_view_hides_anonymous_respondent() {
        let now = Utc::now();
        let mut record = EvaluationRecord {
            id: 7,
            respondent_email: "a@co.com".into(),
            respondent_name: "Aoki".into(),
            evaluatee_name: "Suzuki".into(),
            original_evaluatee_name: None,
            category: Category::Contribution,
            week: "W1".into(),
            content: "good job".into(),
            is_anonymous: true,
            is_hidden: false,
            name_validity: NameValidity::Valid,
            needs_name_correction: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(ReceivedEvaluation::from_record(&record, "匿名").display_name, "匿名");

        record.is_anonymous = false;
        assert_eq!(ReceivedEvaluation::from_record(&record, "匿名").display_name, "Aoki");
    }
}
