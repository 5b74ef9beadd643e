//! Consistency issue types.
//!
//! Each variant carries only the data needed to describe the finding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Fails the check
    Error,
    /// Informative only
    Warning,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A finding of the consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    // Society checks
    /// Society id defined more than once
    DuplicateSociety { dataset: String, id: String },
    /// Society without a Glottocode
    MissingGlottocode { dataset: String, society: String },
    /// Glottocode not known to Glottolog
    UnknownGlottocode {
        dataset: String,
        society: String,
        glottocode: String,
    },
    /// Glottocode of a Bookkeeping pseudo-language
    BookkeepingGlottocode {
        dataset: String,
        society: String,
        glottocode: String,
    },
    /// Societies sharing an xd_id disagree on the Glottocode
    AmbiguousXdId {
        xd_id: String,
        glottocodes: Vec<String>,
    },

    // Variable checks
    /// Variable id defined more than once
    DuplicateVariable { dataset: String, id: String },
    /// Code row for a variable that is not defined
    OrphanCode {
        dataset: String,
        var_id: String,
        code: String,
    },

    // Data checks
    /// Data record for a variable that is not defined
    UndefinedVariable {
        dataset: String,
        soc_id: String,
        var_id: String,
    },
    /// Data record with a code outside the variable's code set
    InvalidCode {
        dataset: String,
        soc_id: String,
        var_id: String,
        code: String,
    },
    /// Reference to a key missing from the bibliography
    UnknownSource {
        dataset: String,
        soc_id: String,
        key: String,
    },

    // Phylogeny checks
    /// Phylogeny files could not be loaded
    UnreadablePhylogeny { phylogeny: String, message: String },
    /// Taxon listed more than once
    DuplicateTaxon { phylogeny: String, taxon: String },
    /// Taxon with a malformed or unknown Glottocode
    InvalidTaxonGlottocode {
        phylogeny: String,
        taxon: String,
        glottocode: String,
    },
    /// Taxon linked to an undefined society
    UnknownTaxonSociety {
        phylogeny: String,
        taxon: String,
        soc_id: String,
    },
    /// Taxon linked to an undefined xd_id
    UnknownTaxonXdId {
        phylogeny: String,
        taxon: String,
        xd_id: String,
    },
    /// Tree leaf without a taxon row
    UnmappedLeaf { phylogeny: String, leaf: String },
    /// Named inner node without a taxon row
    UnmappedNode { phylogeny: String, node: String },
    /// Taxon row that names no tree node
    UnusedTaxon { phylogeny: String, taxon: String },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::MissingGlottocode { .. }
            | Issue::UnknownGlottocode { .. }
            | Issue::BookkeepingGlottocode { .. }
            | Issue::UnmappedNode { .. }
            | Issue::UnusedTaxon { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short identifier of the rule that produced this issue.
    pub fn rule_id(&self) -> &'static str {
        match self {
            Issue::DuplicateSociety { .. } => "duplicate-society",
            Issue::MissingGlottocode { .. } => "missing-glottocode",
            Issue::UnknownGlottocode { .. } => "unknown-glottocode",
            Issue::BookkeepingGlottocode { .. } => "bookkeeping-glottocode",
            Issue::AmbiguousXdId { .. } => "ambiguous-xd-id",
            Issue::DuplicateVariable { .. } => "duplicate-variable",
            Issue::OrphanCode { .. } => "orphan-code",
            Issue::UndefinedVariable { .. } => "undefined-variable",
            Issue::InvalidCode { .. } => "invalid-code",
            Issue::UnknownSource { .. } => "unknown-source",
            Issue::UnreadablePhylogeny { .. } => "unreadable-phylogeny",
            Issue::DuplicateTaxon { .. } => "duplicate-taxon",
            Issue::InvalidTaxonGlottocode { .. } => "invalid-taxon-glottocode",
            Issue::UnknownTaxonSociety { .. } => "unknown-taxon-society",
            Issue::UnknownTaxonXdId { .. } => "unknown-taxon-xd-id",
            Issue::UnmappedLeaf { .. } => "unmapped-leaf",
            Issue::UnmappedNode { .. } => "unmapped-node",
            Issue::UnusedTaxon { .. } => "unused-taxon",
        }
    }

    /// The dataset or phylogeny the issue belongs to, if any.
    pub fn scope(&self) -> Option<&str> {
        match self {
            Issue::DuplicateSociety { dataset, .. }
            | Issue::MissingGlottocode { dataset, .. }
            | Issue::UnknownGlottocode { dataset, .. }
            | Issue::BookkeepingGlottocode { dataset, .. }
            | Issue::DuplicateVariable { dataset, .. }
            | Issue::OrphanCode { dataset, .. }
            | Issue::UndefinedVariable { dataset, .. }
            | Issue::InvalidCode { dataset, .. }
            | Issue::UnknownSource { dataset, .. } => Some(dataset),
            Issue::UnreadablePhylogeny { phylogeny, .. }
            | Issue::DuplicateTaxon { phylogeny, .. }
            | Issue::InvalidTaxonGlottocode { phylogeny, .. }
            | Issue::UnknownTaxonSociety { phylogeny, .. }
            | Issue::UnknownTaxonXdId { phylogeny, .. }
            | Issue::UnmappedLeaf { phylogeny, .. }
            | Issue::UnmappedNode { phylogeny, .. }
            | Issue::UnusedTaxon { phylogeny, .. } => Some(phylogeny),
            Issue::AmbiguousXdId { .. } => None,
        }
    }

    /// Format message with issue-specific data.
    pub fn message(&self) -> String {
        match self {
            Issue::DuplicateSociety { id, .. } => format!("duplicate society ID: {id}"),
            Issue::MissingGlottocode { society, .. } => {
                format!("society {society} has no glottocode")
            }
            Issue::UnknownGlottocode {
                society, glottocode, ..
            } => format!("society {society} mapped to unknown glottocode {glottocode}"),
            Issue::BookkeepingGlottocode {
                society, glottocode, ..
            } => format!("society {society} mapped to Bookkeeping language {glottocode}"),
            Issue::AmbiguousXdId { xd_id, glottocodes } => format!(
                "xd_id {xd_id} mapped to multiple glottocodes: {}",
                glottocodes.join(", ")
            ),
            Issue::DuplicateVariable { id, .. } => format!("duplicate variable ID: {id}"),
            Issue::OrphanCode { var_id, code, .. } => {
                format!("code {code} for undefined variable {var_id}")
            }
            Issue::UndefinedVariable { soc_id, var_id, .. } => {
                format!("undefined variable ID {var_id} in data of society {soc_id}")
            }
            Issue::InvalidCode {
                soc_id,
                var_id,
                code,
                ..
            } => format!("undefined code {var_id}={code} in data of society {soc_id}"),
            Issue::UnknownSource { soc_id, key, .. } => {
                format!("undefined source key {key} referenced by society {soc_id}")
            }
            Issue::UnreadablePhylogeny { message, .. } => {
                format!("invalid summary tree: {message}")
            }
            Issue::DuplicateTaxon { taxon, .. } => format!("duplicate taxon: {taxon}"),
            Issue::InvalidTaxonGlottocode {
                taxon, glottocode, ..
            } => format!("taxon {taxon} has invalid glottocode {glottocode}"),
            Issue::UnknownTaxonSociety { taxon, soc_id, .. } => {
                format!("taxon {taxon} linked to unknown society {soc_id}")
            }
            Issue::UnknownTaxonXdId { taxon, xd_id, .. } => {
                format!("taxon {taxon} linked to unknown xd_id {xd_id}")
            }
            Issue::UnmappedLeaf { leaf, .. } => format!("tree leaf {leaf} missing from taxa"),
            Issue::UnmappedNode { node, .. } => {
                format!("inner tree node {node} missing from taxa")
            }
            Issue::UnusedTaxon { taxon, .. } => format!("taxon {taxon} not found in tree"),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope() {
            Some(scope) => write!(f, "{scope}: {}", self.message()),
            None => f.write_str(&self.message()),
        }
    }
}
