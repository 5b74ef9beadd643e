//! Newick trees and the TREES block of Nexus files.
//!
//! Newick text is read and written by `newick-rs`; this module adds the
//! Nexus glue (TRANSLATE table, first tree, comments) and pruning to a set of
//! names.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use newick_rs::{FromNewick, ToNewick};
use regex::Regex;

use crate::error::{IngestError, Result};
use crate::files::read_text;

/// A rooted tree; every node is itself a `Tree`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub name: String,
    pub length: Option<f64>,
    pub children: Vec<Tree>,
}

impl Tree {
    /// Parse one Newick tree; the terminating `;` is optional and `[...]`
    /// comments are dropped.
    pub fn parse(newick: &str) -> Result<Self> {
        let text = COMMENT_RE.replace_all(newick, "").replace(['\n', '\r'], " ");
        let statement = format!("{};", text.trim().trim_end_matches(';').trim_end());
        if statements(&statement).len() > 1 {
            return Err(IngestError::Newick {
                message: "trailing characters after tree".to_string(),
            });
        }
        newick_rs::from_newick(&statement).map_err(|error| IngestError::Newick {
            message: format!("{error:?}"),
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Names of all leaves, left to right.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.visit(&mut |node| {
            if node.is_leaf() {
                names.push(node.name.clone());
            }
        });
        names
    }

    /// Names of all nodes, including internal ones, in preorder.
    pub fn node_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.visit(&mut |node| {
            if !node.name.is_empty() {
                names.push(node.name.clone());
            }
        });
        names
    }

    pub fn visit(&self, f: &mut impl FnMut(&Tree)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Keep only nodes named in `keep` and their ancestors.
    ///
    /// Internal nodes left with a single child are collapsed into that child
    /// unless they are named in `keep` themselves. The root is always kept.
    pub fn prune(&mut self, keep: &BTreeSet<String>) {
        let children = std::mem::take(&mut self.children);
        self.children = children
            .into_iter()
            .filter_map(|child| child.pruned(keep))
            .collect();
    }

    fn pruned(mut self, keep: &BTreeSet<String>) -> Option<Tree> {
        let children = std::mem::take(&mut self.children);
        let mut children: Vec<Tree> = children
            .into_iter()
            .filter_map(|child| child.pruned(keep))
            .collect();
        let kept = keep.contains(&self.name);
        match children.len() {
            0 if !kept => None,
            1 if !kept => children.pop(),
            _ => {
                self.children = children;
                Some(self)
            }
        }
    }

    /// Newick text, terminated by `;`.
    pub fn to_newick(&self) -> String {
        newick_rs::to_newick(self)
    }
}

impl FromNewick for Tree {
    fn leaf(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn internal(name: String, children: Vec<Self>) -> Self {
        Self {
            name,
            length: None,
            children,
        }
    }

    fn update_length(self, length: Option<f64>) -> Self {
        Self { length, ..self }
    }
}

impl ToNewick for Tree {
    type Child = Tree;

    fn get_name(&self) -> String {
        quote_label(&self.name)
    }

    fn get_children(&self) -> Vec<&Tree> {
        self.children.iter().collect()
    }

    fn get_length(&self) -> Option<f64> {
        self.length
    }
}

fn quote_label(name: &str) -> String {
    if name.chars().any(|c| "()[]':;,".contains(c) || c.is_whitespace()) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

/// One `tree NAME = NEWICK;` statement of a TREES block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NexusTree {
    pub name: String,
    /// Newick text as written, including annotations and the final `;`.
    pub newick: String,
}

/// The TREES block of a Nexus file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NexusFile {
    pub translate: BTreeMap<String, String>,
    pub trees: Vec<NexusTree>,
}

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("static comment pattern compiles"));

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([(,])\s*([^\s(),:;\[\]']+)").expect("static label pattern compiles")
});

impl NexusFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        Self::parse(&text).map_err(|message| IngestError::Nexus {
            path: PathBuf::from(path),
            message,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        if !text.trim_start().to_ascii_lowercase().starts_with("#nexus") {
            return Err("missing #NEXUS header".to_string());
        }
        let lower = text.to_ascii_lowercase();
        let start = lower
            .find("begin trees;")
            .ok_or_else(|| "no TREES block".to_string())?;
        let body = &text[start + "begin trees;".len()..];

        let mut nexus = Self::default();
        for statement in statements(body) {
            let statement = statement.trim();
            let keyword = statement
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            match keyword.as_str() {
                "end" | "endblock" => break,
                "translate" => {
                    for pair in statement["translate".len()..].split(',') {
                        if let Some((key, value)) = pair.trim().split_once(char::is_whitespace) {
                            let value = value.trim();
                            let value = value
                                .strip_prefix('\'')
                                .and_then(|v| v.strip_suffix('\''))
                                .map(|v| v.replace("''", "'"))
                                .unwrap_or_else(|| value.to_string());
                            nexus.translate.insert(key.to_string(), value);
                        }
                    }
                }
                "tree" | "utree" => {
                    let (head, newick) = statement
                        .split_once('=')
                        .ok_or_else(|| format!("tree statement without '=': {statement}"))?;
                    let name = head
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("")
                        .trim_start_matches('*')
                        .to_string();
                    nexus.trees.push(NexusTree {
                        name,
                        newick: format!("{};", newick.trim()),
                    });
                }
                _ => {}
            }
        }
        Ok(nexus)
    }

    /// Newick of the first tree, with translated labels and without comments.
    pub fn first_newick(&self) -> Option<String> {
        let tree = self.trees.first()?;
        let newick = self.detranslate(&tree.newick);
        Some(COMMENT_RE.replace_all(&newick, "").trim().to_string())
    }

    fn detranslate(&self, newick: &str) -> String {
        if self.translate.is_empty() {
            return newick.to_string();
        }
        LABEL_RE
            .replace_all(newick, |caps: &regex::Captures<'_>| {
                let label = &caps[2];
                let name = self
                    .translate
                    .get(label)
                    .map(|name| quote_label(name))
                    .unwrap_or_else(|| label.to_string());
                format!("{}{}", &caps[1], name)
            })
            .into_owned()
    }

    /// Render a single-tree Nexus file.
    pub fn render_single(name: &str, newick: &str) -> String {
        format!("#NEXUS\nBegin trees;\n    tree {name} = {newick}\nend;\n")
    }
}

/// Split on `;` outside of `[...]` comments and quoted labels.
fn statements(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_comment = false;
    let mut in_quote = false;
    for (i, c) in body.char_indices() {
        match c {
            '[' if !in_quote => in_comment = true,
            ']' if !in_quote => in_comment = false,
            '\'' if !in_comment => in_quote = !in_quote,
            ';' if !in_comment && !in_quote => {
                out.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let tree = Tree::parse("((A:1,B:2.5)AB:0.1,'C d':3)root;").unwrap();
        assert_eq!(tree.name, "root");
        assert_eq!(tree.leaf_names(), vec!["A", "B", "C d"]);
        assert_eq!(tree.to_newick(), "((A:1,B:2.5)AB:0.1,'C d':3)root;");
    }

    #[test]
    fn test_lengths_and_line_breaks() {
        let tree = Tree::parse("(A:0.5,\n  B:1.25)C").unwrap();
        assert_eq!(tree.children[0].length, Some(0.5));
        assert_eq!(tree.to_newick(), "(A:0.5,B:1.25)C;");
    }

    #[test]
    fn test_comments_are_ignored() {
        let tree = Tree::parse("[&R] (A[&x=1]:1,B:1);").unwrap();
        assert_eq!(tree.leaf_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_invalid_newick() {
        assert!(Tree::parse("((A,B);").is_err());
        assert!(Tree::parse("(A:x,B);").is_err());
        assert!(Tree::parse("(A,B);junk").is_err());
    }

    #[test]
    fn test_prune_collapses_unary_nodes() {
        let mut tree = Tree::parse("((A,B)AB,(C,D)CD)root;").unwrap();
        let keep: BTreeSet<String> = ["A", "C", "D"].iter().map(|s| s.to_string()).collect();
        tree.prune(&keep);
        assert_eq!(tree.to_newick(), "(A,(C,D)CD)root;");
    }

    #[test]
    fn test_prune_keeps_named_internal_nodes() {
        let mut tree = Tree::parse("((A,B)AB,C)root;").unwrap();
        let keep: BTreeSet<String> = ["AB"].iter().map(|s| s.to_string()).collect();
        tree.prune(&keep);
        assert_eq!(tree.to_newick(), "(AB)root;");
    }

    #[test]
    fn test_nexus_translate_and_first_tree() {
        let text = "#NEXUS\nBEGIN TREES;\n  TRANSLATE\n    1 Kapauku,\n    2 'Ekari people';\n  TREE tree1 = [&R] (1:1,2:2);\n  TREE tree2 = (1,2);\nEND;\n";
        let nexus = NexusFile::parse(text).unwrap();
        assert_eq!(nexus.trees.len(), 2);
        assert_eq!(nexus.trees[0].name, "tree1");
        assert_eq!(
            nexus.first_newick().unwrap(),
            "(Kapauku:1,'Ekari people':2);"
        );
    }

    #[test]
    fn test_render_single_parses_back() {
        let text = NexusFile::render_single("glottolog_global", "(a,b);");
        assert_eq!(
            text,
            "#NEXUS\nBegin trees;\n    tree glottolog_global = (a,b);\nend;\n"
        );
        let nexus = NexusFile::parse(&text).unwrap();
        assert_eq!(nexus.first_newick().unwrap(), "(a,b);");
    }

    #[test]
    fn test_nexus_without_trees_block() {
        assert!(NexusFile::parse("#NEXUS\nbegin taxa;\nend;\n").is_err());
        assert!(NexusFile::parse("(a,b);").is_err());
    }
}
