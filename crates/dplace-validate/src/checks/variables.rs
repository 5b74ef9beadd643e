//! Variable ids and their code tables.

use std::collections::{BTreeMap, BTreeSet};

use dplace_ingest::{Repository, Result};

use crate::issue::Issue;
use crate::report::DiagnosticSink;

/// Valid codes per variable id; empty for variables without codes.
pub(crate) type CodeSets = BTreeMap<String, BTreeSet<String>>;

/// Check variable ids and code rows, returning the code set of each variable.
pub(crate) fn check(
    repos: &Repository,
    sink: &mut (impl DiagnosticSink + ?Sized),
) -> Result<CodeSets> {
    let mut code_sets = CodeSets::new();

    for dataset in repos.datasets()? {
        let variables = dataset.variables()?;
        for variable in variables {
            if code_sets.contains_key(&variable.id) {
                sink.report(Issue::DuplicateVariable {
                    dataset: dataset.id().to_string(),
                    id: variable.id.clone(),
                });
            }
            let codes = if variable.var_type.has_codes() {
                variable.codes.iter().map(|c| c.code.clone()).collect()
            } else {
                BTreeSet::new()
            };
            code_sets.insert(variable.id.clone(), codes);
        }

        let defined: BTreeSet<&str> = variables.iter().map(|v| v.id.as_str()).collect();
        for code in dataset.codes()? {
            if !defined.contains(code.var_id.as_str()) {
                sink.report(Issue::OrphanCode {
                    dataset: dataset.id().to_string(),
                    var_id: code.var_id.clone(),
                    code: code.code.clone(),
                });
            }
        }
    }
    Ok(code_sets)
}
