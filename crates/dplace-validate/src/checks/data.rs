//! Data records against variables, codes and the bibliography.

use dplace_ingest::{Repository, Result};
use dplace_model::NA;

use crate::checks::variables::CodeSets;
use crate::issue::Issue;
use crate::report::DiagnosticSink;

/// Check every data record.
///
/// Codes are only checked for variables with more than one defined code:
/// several datasets list a single placeholder code for variables whose
/// values are free-form. `NA` is accepted for every variable.
pub(crate) fn check(
    repos: &Repository,
    code_sets: &CodeSets,
    sink: &mut (impl DiagnosticSink + ?Sized),
) -> Result<()> {
    let sources = repos.sources()?;

    for dataset in repos.datasets()? {
        for record in dataset.data()? {
            match code_sets.get(&record.var_id) {
                None => sink.report(Issue::UndefinedVariable {
                    dataset: dataset.id().to_string(),
                    soc_id: record.soc_id.clone(),
                    var_id: record.var_id.clone(),
                }),
                Some(codes)
                    if codes.len() > 1 && record.code != NA && !codes.contains(&record.code) =>
                {
                    sink.report(Issue::InvalidCode {
                        dataset: dataset.id().to_string(),
                        soc_id: record.soc_id.clone(),
                        var_id: record.var_id.clone(),
                        code: record.code.clone(),
                    });
                }
                Some(_) => {}
            }
            for reference in &record.references {
                if !sources.contains(&reference.key) {
                    sink.report(Issue::UnknownSource {
                        dataset: dataset.id().to_string(),
                        soc_id: record.soc_id.clone(),
                        key: reference.key.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
