//! Loads the shipped reference tables (§6) into lookup structures: a
//! synonym map from free-text declared relationships to canonical primary
//! groups, and an opposite map used for directional inversion.

use crate::error::{PedigreeError, Result};
use crate::model::RelationGroup;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The bundled reference tables, parsed once and shared across the process.
/// Callers that want to surface a parse failure rather than panic should use
/// [`RelationshipsLookup::load_default`] directly instead.
pub static DEFAULT: Lazy<RelationshipsLookup> =
    Lazy::new(|| RelationshipsLookup::load_default().expect("bundled reference tables are malformed"));

const RELATIONSHIPS_LOOKUP_TSV: &str = include_str!("../assets/relationships_lookup.tsv");
const RELATIONSHIPS_AND_OPPOSITES_TSV: &str =
    include_str!("../assets/relationships_and_opposites.tsv");

/// Synonym and opposite tables populated from `relationships_lookup.tsv` and
/// `relationships_and_opposites.tsv`.
#[derive(Debug, Clone)]
pub struct RelationshipsLookup {
    synonyms: HashMap<String, RelationGroup>,
    opposites: HashMap<RelationGroup, RelationGroup>,
}

impl RelationshipsLookup {
    /// Parse the two reference tables bundled with the crate.
    pub fn load_default() -> Result<Self> {
        let mut lookup = Self {
            synonyms: HashMap::new(),
            opposites: HashMap::new(),
        };
        lookup.load_lookup_table(RELATIONSHIPS_LOOKUP_TSV)?;
        lookup.load_opposites_table(RELATIONSHIPS_AND_OPPOSITES_TSV);
        Ok(lookup)
    }

    fn load_lookup_table(&mut self, content: &str) -> Result<()> {
        for (lineno, line) in content.lines().enumerate() {
            if lineno == 0 || line.trim().is_empty() {
                continue; // header row
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 4 {
                return Err(PedigreeError::ReferenceTable(format!(
                    "relationships_lookup.tsv line {}: expected 4 columns, got {}",
                    lineno + 1,
                    fields.len()
                )));
            }
            let [abbrev1, abbrev2, canonical, opposite] = [fields[0], fields[1], fields[2], fields[3]];
            let canonical_group = RelationGroup::from_str(canonical).ok_or_else(|| {
                PedigreeError::ReferenceTable(format!(
                    "relationships_lookup.tsv line {}: unknown canonical group {canonical:?}",
                    lineno + 1
                ))
            })?;
            let opposite_group = RelationGroup::from_str(opposite).ok_or_else(|| {
                PedigreeError::ReferenceTable(format!(
                    "relationships_lookup.tsv line {}: unknown opposite group {opposite:?}",
                    lineno + 1
                ))
            })?;
            self.synonyms
                .insert(abbrev1.trim().to_lowercase(), canonical_group);
            self.synonyms
                .insert(abbrev2.trim().to_lowercase(), canonical_group);
            self.synonyms
                .entry(canonical.trim().to_lowercase())
                .or_insert(canonical_group);
            self.opposites.entry(canonical_group).or_insert(opposite_group);
        }
        Ok(())
    }

    /// Extends the opposite map. Rows naming a composed/ambiguous label (not
    /// a primary group) are skipped: the engine only consults opposites
    /// after resolution has collapsed an edge to a primary label, so those
    /// rows exist for the reference file's completeness but have no
    /// operational counterpart here.
    fn load_opposites_table(&mut self, content: &str) {
        for (lineno, line) in content.lines().enumerate() {
            if lineno == 0 || line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 2 {
                tracing::debug!("relationships_and_opposites.tsv line {}: skipping malformed row", lineno + 1);
                continue;
            }
            let (group, opposite) = (fields[0], fields[1]);
            if let (Some(g), Some(o)) = (RelationGroup::from_str(group), RelationGroup::from_str(opposite)) {
                self.opposites.entry(g).or_insert(o);
            } else {
                tracing::debug!(
                    "relationships_and_opposites.tsv line {}: non-primary group {group:?}, skipping",
                    lineno + 1
                );
            }
        }
    }

    /// Normalizes a free-text declared relationship to a canonical primary
    /// group. Returns `None` for unknown strings (§4.1 declared-relationship
    /// normalization); callers drop the owning EC entry.
    pub fn normalize(&self, declared: &str) -> Option<RelationGroup> {
        self.synonyms.get(&declared.trim().to_lowercase()).copied()
    }

    /// The declared opposite of a primary group, preferring the reference
    /// table's value over [`RelationGroup::opposite`]'s built-in fallback.
    pub fn opposite(&self, group: RelationGroup) -> Option<RelationGroup> {
        self.opposites.get(&group).copied().or_else(|| group.opposite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_without_error() {
        RelationshipsLookup::load_default().unwrap();
    }

    #[test]
    fn normalizes_common_synonyms() {
        let lookup = RelationshipsLookup::load_default().unwrap();
        assert_eq!(lookup.normalize("mom"), Some(RelationGroup::Parent));
        assert_eq!(lookup.normalize("MOM"), Some(RelationGroup::Parent));
        assert_eq!(lookup.normalize("  mother "), Some(RelationGroup::Parent));
        assert_eq!(lookup.normalize("sister"), Some(RelationGroup::Sibling));
        assert_eq!(lookup.normalize("xyzzy"), None);
    }

    #[test]
    fn opposite_covers_every_primary_group() {
        let lookup = RelationshipsLookup::load_default().unwrap();
        for g in RelationGroup::ALL {
            assert!(lookup.opposite(g).is_some(), "no opposite for {g}");
        }
    }
}
