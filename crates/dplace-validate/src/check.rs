//! The full consistency pass over a repository.

use dplace_ingest::{Repository, Result, paths};

use crate::checks;
use crate::glottocodes::GlottocodeLookup;
use crate::issue::{Issue, Severity};
use crate::report::DiagnosticSink;

/// Forwards issues while counting errors.
struct Counting<'a, S: ?Sized> {
    inner: &'a mut S,
    errors: usize,
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Counting<'_, S> {
    fn report(&mut self, issue: Issue) {
        if issue.severity() == Severity::Error {
            self.errors += 1;
        }
        self.inner.report(issue);
    }
}

/// Check the repository for consistency, reporting every finding to `sink`.
///
/// Returns `true` when no error was found; warnings do not affect the
/// result. Failures to read the repository itself (index files, malformed
/// rows, the bibliography) are returned as errors rather than reported.
pub fn check<S>(repos: &Repository, sink: &mut S) -> Result<bool>
where
    S: DiagnosticSink + ?Sized,
{
    let _span = tracing::info_span!("check", repos = %repos.root().display()).entered();
    let mut sink = Counting {
        inner: sink,
        errors: 0,
    };

    let glottocodes = GlottocodeLookup::load(&repos.path(paths::GLOTTOLOG_CSV))?;
    checks::societies::check(repos, &glottocodes, &mut sink)?;
    let code_sets = checks::variables::check(repos, &mut sink)?;
    checks::data::check(repos, &code_sets, &mut sink)?;
    checks::phylogenies::check(repos, &glottocodes, &mut sink)?;

    tracing::info!(errors = sink.errors, "consistency check finished");
    Ok(sink.errors == 0)
}
