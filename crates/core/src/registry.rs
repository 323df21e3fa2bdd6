use serde::{Deserialize, Serialize};

/// Registry entry. `official_name` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub official_name: String,
    pub email: Option<String>,
}

/// Operator-curated alias for an official name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    pub variant_name: String,
    pub official_name: String,
}
