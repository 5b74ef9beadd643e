//! Classification trees derived from the languoid hierarchy.

use std::collections::{BTreeMap, BTreeSet};

use dplace_ingest::Tree;

use crate::languoid::{Languoid, Level};

const BRANCH_LENGTH: f64 = 1.0;

/// Languoids indexed by Glottocode, with their children.
#[derive(Debug)]
pub struct Classification {
    languoids: BTreeMap<String, Languoid>,
    children: BTreeMap<String, Vec<String>>,
}

impl Classification {
    pub fn new(languoids: Vec<Languoid>) -> Self {
        let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for languoid in &languoids {
            if let Some(parent) = languoid.parent_id() {
                children
                    .entry(parent.to_string())
                    .or_default()
                    .push(languoid.id.clone());
            }
        }
        for ids in children.values_mut() {
            ids.sort();
        }
        Self {
            languoids: languoids.into_iter().map(|l| (l.id.clone(), l)).collect(),
            children,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Languoid> {
        self.languoids.get(id)
    }

    pub fn languoids(&self) -> impl Iterator<Item = &Languoid> {
        self.languoids.values()
    }

    pub fn len(&self) -> usize {
        self.languoids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languoids.is_empty()
    }

    /// Top-level languoids that are not pseudo families, ordered by name.
    pub fn top_level(&self) -> Vec<&Languoid> {
        let mut top: Vec<&Languoid> = self
            .languoids
            .values()
            .filter(|l| l.is_top_level() && !l.is_pseudo_family())
            .collect();
        top.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        top
    }

    /// The full subtree below `id`, every node labeled with its Glottocode.
    pub fn subtree(&self, id: &str) -> Tree {
        let children = self
            .children
            .get(id)
            .map(|ids| ids.iter().map(|child| self.subtree(child)).collect())
            .unwrap_or_default();
        Tree {
            name: id.to_string(),
            length: Some(BRANCH_LENGTH),
            children,
        }
    }
}

/// A classification tree restricted to the Glottocodes in use.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedTree {
    pub name: String,
    pub tree: Tree,
    /// Glottocodes in use that label a node of the tree.
    pub taxa: BTreeSet<String>,
}

impl PrunedTree {
    pub fn newick(&self) -> String {
        self.tree.to_newick()
    }
}

pub fn family_tree_name(family_id: &str) -> String {
    format!("glottolog_{family_id}")
}

pub const GLOBAL_TREE: &str = "glottolog_global";

/// Prune under an unnamed root; `None` when no node is in `keep`.
fn prune_under_root(name: String, children: Vec<Tree>, keep: &BTreeSet<String>) -> Option<PrunedTree> {
    let mut tree = Tree {
        children,
        ..Tree::default()
    };
    tree.prune(keep);
    let taxa: BTreeSet<String> = tree
        .node_names()
        .into_iter()
        .filter(|name| keep.contains(name))
        .collect();
    if taxa.is_empty() {
        return None;
    }
    Some(PrunedTree { name, tree, taxa })
}

/// The trees written for a repository: one per family, then the global one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationTrees {
    /// Family trees with the family they were built from.
    pub families: Vec<(String, PrunedTree)>,
    pub global: Option<PrunedTree>,
}

/// Build per-family trees and the global tree for the Glottocodes in `keep`.
///
/// Top-level languages (isolates) only appear in the global tree.
pub fn build_trees(classification: &Classification, keep: &BTreeSet<String>) -> ClassificationTrees {
    let mut trees = ClassificationTrees::default();
    let mut global_children = Vec::new();
    for top in classification.top_level() {
        let subtree = classification.subtree(&top.id);
        if top.level == Level::Family {
            let Some(family) =
                prune_under_root(family_tree_name(&top.id), vec![subtree], keep)
            else {
                continue;
            };
            global_children.extend(family.tree.children.iter().cloned());
            tracing::debug!(family = %top.id, taxa = family.taxa.len(), "built family tree");
            trees.families.push((top.id.clone(), family));
        } else {
            global_children.push(subtree);
        }
    }
    trees.global = prune_under_root(GLOBAL_TREE.to_string(), global_children, keep);
    trees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languoid::Ancestor;

    fn languoid(id: &str, name: &str, level: Level, lineage: &[(&str, Level)]) -> Languoid {
        Languoid {
            id: id.to_string(),
            name: name.to_string(),
            level,
            iso: None,
            macroareas: Vec::new(),
            lineage: lineage
                .iter()
                .map(|(id, level)| Ancestor {
                    name: (*id).to_string(),
                    id: (*id).to_string(),
                    level: *level,
                })
                .collect(),
        }
    }

    fn sample() -> Classification {
        use Level::{Dialect, Family, Language};
        Classification::new(vec![
            languoid("fama1234", "Alpha", Family, &[]),
            languoid("suba1234", "Alpha Sub", Family, &[("fama1234", Family)]),
            languoid("lana1234", "Lang A", Language, &[("fama1234", Family), ("suba1234", Family)]),
            languoid("lanb1234", "Lang B", Language, &[("fama1234", Family), ("suba1234", Family)]),
            languoid("lanc1234", "Lang C", Language, &[("fama1234", Family)]),
            languoid(
                "dial1234",
                "Dialect",
                Dialect,
                &[("fama1234", Family), ("lanc1234", Language)],
            ),
            languoid("isol1234", "Isolate", Language, &[]),
            languoid("book1242", "Bookkeeping", Family, &[]),
            languoid("bklg1234", "Kept", Language, &[("book1242", Family)]),
        ])
    }

    fn keep(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn subtrees_label_nodes_with_glottocodes() {
        let classification = sample();
        assert_eq!(
            classification.subtree("lanc1234").to_newick(),
            "(dial1234:1)lanc1234:1;"
        );
        let names: Vec<&str> = classification
            .top_level()
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(names, vec!["fama1234", "isol1234"]);
    }

    #[test]
    fn family_trees_are_pruned_to_used_glottocodes() {
        let trees = build_trees(&sample(), &keep(&["lana1234", "lanb1234", "isol1234", "bklg1234"]));
        assert_eq!(trees.families.len(), 1);
        let (family, tree) = &trees.families[0];
        assert_eq!(family, "fama1234");
        assert_eq!(tree.name, "glottolog_fama1234");
        assert_eq!(tree.newick(), "((lana1234:1,lanb1234:1)suba1234:1);");
        assert_eq!(tree.taxa, keep(&["lana1234", "lanb1234"]));

        let global = trees.global.expect("global tree");
        assert_eq!(global.taxa, keep(&["isol1234", "lana1234", "lanb1234"]));
        assert_eq!(
            global.newick(),
            "((lana1234:1,lanb1234:1)suba1234:1,isol1234:1);"
        );
    }

    #[test]
    fn families_without_used_glottocodes_are_skipped() {
        let trees = build_trees(&sample(), &keep(&["isol1234"]));
        assert!(trees.families.is_empty());
        assert_eq!(trees.global.map(|t| t.taxa), Some(keep(&["isol1234"])));

        let none = build_trees(&sample(), &keep(&["bklg1234"]));
        assert!(none.global.is_none());
    }
}
