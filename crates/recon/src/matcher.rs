use std::collections::{HashMap, HashSet};

use evalgrid_core::{NameMapping, Participant};

/// How an evaluatee name resolved against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The name is an official name.
    Exact,
    /// The name is a known alias of this official name.
    Mapped(&'a str),
    Unmatched,
}

/// Lookup tables for one reconciliation pass.
///
/// Matching is exact and case-sensitive; no trimming or normalization.
#[derive(Debug, Default)]
pub struct NameIndex {
    official: HashSet<String>,
    aliases: HashMap<String, String>,
}

impl NameIndex {
    /// Build from the registry and the mapping table.
    ///
    /// With `strict`, mappings whose official name is not registered are
    /// dropped so they can never validate a record.
    pub fn build(participants: &[Participant], mappings: &[NameMapping], strict: bool) -> Self {
        let official: HashSet<String> =
            participants.iter().map(|p| p.official_name.clone()).collect();

        let mut aliases = HashMap::with_capacity(mappings.len());
        for m in mappings {
            if !official.contains(&m.official_name) {
                if strict {
                    log::warn!(
                        "ignoring mapping '{}' -> '{}': target not in participant list",
                        m.variant_name,
                        m.official_name
                    );
                    continue;
                }
                log::warn!(
                    "mapping '{}' -> '{}' targets a name outside the participant list",
                    m.variant_name,
                    m.official_name
                );
            }
            aliases.insert(m.variant_name.clone(), m.official_name.clone());
        }

        Self { official, aliases }
    }

    /// Exact registry match first, then alias lookup.
    pub fn resolve(&self, name: &str) -> Resolution<'_> {
        if self.official.contains(name) {
            Resolution::Exact
        } else if let Some(official) = self.aliases.get(name) {
            Resolution::Mapped(official)
        } else {
            Resolution::Unmatched
        }
    }

    pub fn official_count(&self) -> usize {
        self.official.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}
