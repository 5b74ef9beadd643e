use anyhow::Result;
use dplace_ingest::Repository;
use dplace_validate::{CheckReport, check};

/// Run the consistency check; the report says whether it passed.
pub fn run_check(repos: &Repository) -> Result<CheckReport> {
    let mut report = CheckReport::new();
    let passed = check(repos, &mut report)?;
    tracing::info!(
        passed,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "check finished"
    );
    Ok(report)
}
