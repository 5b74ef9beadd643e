//! Phylogenies: taxa linkage and agreement between taxa and tree.

use std::collections::BTreeSet;

use dplace_ingest::{Phylogeny, Repository, Result};
use dplace_model::fields::is_glottocode;

use crate::glottocodes::GlottocodeLookup;
use crate::issue::Issue;
use crate::report::DiagnosticSink;

pub(crate) fn check(
    repos: &Repository,
    glottocodes: &GlottocodeLookup,
    sink: &mut (impl DiagnosticSink + ?Sized),
) -> Result<()> {
    let societies = repos.societies()?;
    let xd_ids: BTreeSet<&str> = societies.values().map(|s| s.xd_id.as_str()).collect();

    for phylogeny in repos.phylogenies()? {
        let _span = tracing::debug_span!("phylogeny", id = %phylogeny.id()).entered();
        let unreadable = |message: String| Issue::UnreadablePhylogeny {
            phylogeny: phylogeny.id().to_string(),
            message,
        };
        let taxa = match phylogeny.taxa() {
            Ok(taxa) => taxa,
            Err(err) => {
                sink.report(unreadable(err.to_string()));
                continue;
            }
        };

        let mut names = BTreeSet::new();
        for taxon in taxa {
            let issue = |build: fn(String, String, String) -> Issue, value: &str| {
                build(
                    phylogeny.id().to_string(),
                    taxon.taxon.clone(),
                    value.to_string(),
                )
            };
            if !names.insert(taxon.taxon.as_str()) {
                sink.report(Issue::DuplicateTaxon {
                    phylogeny: phylogeny.id().to_string(),
                    taxon: taxon.taxon.clone(),
                });
            }
            if !taxon.glottocode.is_empty()
                && !(is_glottocode(&taxon.glottocode) && glottocodes.contains(&taxon.glottocode))
            {
                sink.report(issue(invalid_glottocode, &taxon.glottocode));
            }
            for soc_id in &taxon.soc_ids {
                if !societies.contains_key(soc_id) {
                    sink.report(issue(unknown_society, soc_id));
                }
            }
            for xd_id in &taxon.xd_ids {
                if !xd_ids.contains(xd_id.as_str()) {
                    sink.report(issue(unknown_xd_id, xd_id));
                }
            }
        }

        match phylogeny.tree() {
            Ok(tree) => check_tree(phylogeny, &tree.leaf_names(), &tree.node_names(), &names, sink),
            Err(err) => sink.report(unreadable(err.to_string())),
        }
    }
    Ok(())
}

fn invalid_glottocode(phylogeny: String, taxon: String, glottocode: String) -> Issue {
    Issue::InvalidTaxonGlottocode {
        phylogeny,
        taxon,
        glottocode,
    }
}

fn unknown_society(phylogeny: String, taxon: String, soc_id: String) -> Issue {
    Issue::UnknownTaxonSociety {
        phylogeny,
        taxon,
        soc_id,
    }
}

fn unknown_xd_id(phylogeny: String, taxon: String, xd_id: String) -> Issue {
    Issue::UnknownTaxonXdId {
        phylogeny,
        taxon,
        xd_id,
    }
}

/// Leaves must be taxa; named inner nodes and unused taxa are only noted.
fn check_tree(
    phylogeny: &Phylogeny,
    leaves: &[String],
    nodes: &[String],
    taxa: &BTreeSet<&str>,
    sink: &mut (impl DiagnosticSink + ?Sized),
) {
    let id = phylogeny.id();
    let leaf_set: BTreeSet<&str> = leaves.iter().map(String::as_str).collect();
    for leaf in leaves {
        if !taxa.contains(leaf.as_str()) {
            sink.report(Issue::UnmappedLeaf {
                phylogeny: id.to_string(),
                leaf: leaf.clone(),
            });
        }
    }
    for node in nodes {
        if !leaf_set.contains(node.as_str()) && !taxa.contains(node.as_str()) {
            sink.report(Issue::UnmappedNode {
                phylogeny: id.to_string(),
                node: node.clone(),
            });
        }
    }
    let node_set: BTreeSet<&str> = nodes.iter().map(String::as_str).collect();
    for taxon in taxa {
        if !node_set.contains(taxon) {
            sink.report(Issue::UnusedTaxon {
                phylogeny: id.to_string(),
                taxon: (*taxon).to_string(),
            });
        }
    }
}
