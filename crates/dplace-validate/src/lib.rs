//! Consistency checks for a D-PLACE repository.
//!
//! A single pass over societies, variables, data and phylogenies. Findings
//! are reported to a [`DiagnosticSink`] as they are found and never abort
//! the pass; the verdict only depends on whether an error was reported.
//!
//! ```ignore
//! use dplace_validate::{CheckReport, check};
//!
//! let mut report = CheckReport::new();
//! let passed = check(&repos, &mut report)?;
//! for issue in report.warnings() {
//!     println!("{issue}");
//! }
//! ```

mod check;
mod checks;
pub mod glottocodes;
pub mod issue;
pub mod report;

pub use check::check;
pub use glottocodes::GlottocodeLookup;
pub use issue::{Issue, Severity};
pub use report::{CheckReport, DiagnosticSink};
