use std::path::Path;

use evalgrid_core::Category;
use serde::Deserialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level layout
// ---------------------------------------------------------------------------

/// Which spreadsheet headers feed which fields.
///
/// Every section is optional in TOML; omitted keys fall back to the
/// Microsoft Forms export headers the evaluation survey produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportLayout {
    pub respondent: RespondentColumns,
    pub categories: CategoryColumns,
    pub participants: ParticipantColumns,
}

// ---------------------------------------------------------------------------
// Evaluation export
// ---------------------------------------------------------------------------

/// Columns shared by all four categories of one response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RespondentColumns {
    pub email: String,
    pub name: String,
    pub week: String,
}

impl Default for RespondentColumns {
    fn default() -> Self {
        Self {
            email: "メール".into(),
            name: "名前".into(),
            week: "実施週：週を選択してください".into(),
        }
    }
}

/// Evaluatee-name and content columns of one category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnPair {
    pub name: String,
    pub content: String,
}

impl ColumnPair {
    fn new(name: &str, content: &str) -> Self {
        Self { name: name.into(), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryColumns {
    pub value_practice: ColumnPair,
    pub principle_practice: ColumnPair,
    pub contribution: ColumnPair,
    pub value_promotion: ColumnPair,
}

impl Default for CategoryColumns {
    fn default() -> Self {
        Self {
            value_practice: ColumnPair::new("氏名", "具体的な行動内容"),
            principle_practice: ColumnPair::new("氏名2", "具体的な行動内容2"),
            contribution: ColumnPair::new("氏名：", "具体的な行動内容："),
            value_promotion: ColumnPair::new("氏名3", "具体的な行動内容3"),
        }
    }
}

impl CategoryColumns {
    pub fn get(&self, category: Category) -> &ColumnPair {
        match category {
            Category::ValuePractice => &self.value_practice,
            Category::PrinciplePractice => &self.principle_practice,
            Category::Contribution => &self.contribution,
            Category::ValuePromotion => &self.value_promotion,
        }
    }
}

// ---------------------------------------------------------------------------
// Participant list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParticipantColumns {
    /// Official-name headers, tried in order.
    pub name: Vec<String>,
    /// Email headers, tried in order.
    pub email: Vec<String>,
    /// Use the leftmost cell when no name header matches.
    pub fallback_first_cell: bool,
}

impl Default for ParticipantColumns {
    fn default() -> Self {
        Self {
            name: vec!["正式氏名".into(), "氏名".into()],
            email: vec!["メールアドレス".into(), "メール".into()],
            fallback_first_cell: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ImportLayout {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let layout: ImportLayout =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.respondent;
        for (field, header) in [("email", &r.email), ("name", &r.name), ("week", &r.week)] {
            if header.is_empty() {
                return Err(ConfigError::Validation(format!("respondent.{field} is empty")));
            }
        }

        let mut seen: Vec<(&str, Category)> = Vec::new();
        for category in Category::ALL {
            let pair = self.categories.get(category);
            if pair.name.is_empty() || pair.content.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "categories.{category}: name and content columns are required"
                )));
            }
            if let Some((_, other)) = seen.iter().find(|(h, _)| *h == pair.name) {
                return Err(ConfigError::Validation(format!(
                    "categories.{category} reuses name column '{}' of categories.{other}",
                    pair.name
                )));
            }
            seen.push((pair.name.as_str(), category));
        }

        let p = &self.participants;
        if p.name.is_empty() && !p.fallback_first_cell {
            return Err(ConfigError::Validation(
                "participants: no name column and fallback_first_cell = false".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
