//! Society ids and their Glottolog linkage.

use std::collections::{BTreeMap, BTreeSet};

use dplace_ingest::{Repository, Result};

use crate::glottocodes::GlottocodeLookup;
use crate::issue::Issue;
use crate::report::DiagnosticSink;

/// Check society ids and Glottocodes, and that each xd_id maps to one language.
pub(crate) fn check(
    repos: &Repository,
    glottocodes: &GlottocodeLookup,
    sink: &mut (impl DiagnosticSink + ?Sized),
) -> Result<()> {
    let mut ids = BTreeSet::new();
    let mut by_xd_id: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for dataset in repos.datasets()? {
        for society in dataset.societies()? {
            if !ids.insert(society.id.as_str()) {
                sink.report(Issue::DuplicateSociety {
                    dataset: dataset.id().to_string(),
                    id: society.id.clone(),
                });
            }
            if !society.has_glottocode() {
                sink.report(Issue::MissingGlottocode {
                    dataset: dataset.id().to_string(),
                    society: society.id.clone(),
                });
                continue;
            }
            by_xd_id
                .entry(society.xd_id.as_str())
                .or_default()
                .insert(society.glottocode.as_str());
            if !glottocodes.contains(&society.glottocode) {
                sink.report(Issue::UnknownGlottocode {
                    dataset: dataset.id().to_string(),
                    society: society.id.clone(),
                    glottocode: society.glottocode.clone(),
                });
            } else if glottocodes.is_bookkeeping(&society.glottocode) {
                sink.report(Issue::BookkeepingGlottocode {
                    dataset: dataset.id().to_string(),
                    society: society.id.clone(),
                    glottocode: society.glottocode.clone(),
                });
            }
        }
    }

    for (xd_id, codes) in by_xd_id {
        if codes.len() > 1 {
            sink.report(Issue::AmbiguousXdId {
                xd_id: xd_id.to_string(),
                glottocodes: codes.into_iter().map(str::to_string).collect(),
            });
        }
    }
    Ok(())
}
