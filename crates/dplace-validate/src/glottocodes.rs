//! Known Glottocodes, read from the repository's Glottolog extract.

use std::collections::BTreeMap;
use std::path::Path;

use dplace_ingest::Result;
use dplace_ingest::csv::read_dicts_lenient;

/// Family name Glottolog uses for bookkeeping pseudo-languages.
pub const BOOKKEEPING: &str = "Bookkeeping";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlottocodeLookup {
    /// Glottocode to top-level family name; its own name when top-level.
    families: BTreeMap<String, String>,
}

impl GlottocodeLookup {
    pub fn load(path: &Path) -> Result<Self> {
        let table = read_dicts_lenient(path)?;
        let families = table
            .rows
            .iter()
            .filter_map(|row| {
                let id = row.get("id")?;
                let family = match row.get("family_name") {
                    Some(family) if !family.is_empty() => family,
                    _ => row.get("name")?,
                };
                Some((id.clone(), family.clone()))
            })
            .collect::<BTreeMap<_, _>>();
        tracing::debug!(path = %path.display(), languoids = families.len(), "loaded glottocodes");
        Ok(Self { families })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            families: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn contains(&self, glottocode: &str) -> bool {
        self.families.contains_key(glottocode)
    }

    /// Whether the languoid is, or belongs to, the Bookkeeping pseudo-family.
    pub fn is_bookkeeping(&self, glottocode: &str) -> bool {
        self.families
            .get(glottocode)
            .is_some_and(|family| family == BOOKKEEPING)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
