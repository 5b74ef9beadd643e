//! Languoids of a Glottolog repository clone.
//!
//! The classification is the directory tree below `languoids/tree`: each
//! directory is named by its Glottocode and holds an `md.ini`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dplace_ingest::files::read_text;
use walkdir::WalkDir;

use crate::ini::Ini;

pub const TREE_DIR: &str = "languoids/tree";
const METADATA_FILE: &str = "md.ini";

/// Top-level families that do not group genealogically related languages.
pub const PSEUDO_FAMILIES: &[&str] = &[
    "arti1236", // Artificial Language
    "book1242", // Bookkeeping
    "mixe1287", // Mixed Language
    "pidg1258", // Pidgin
    "sign1238", // Sign Language
    "spee1234", // Speech Register
    "unat1236", // Unattested
    "uncl1493", // Unclassifiable
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Family,
    Language,
    Dialect,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Family => "family",
            Level::Language => "language",
            Level::Dialect => "dialect",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "family" => Ok(Level::Family),
            "language" => Ok(Level::Language),
            "dialect" => Ok(Level::Dialect),
            other => Err(format!("unknown languoid level {other:?}")),
        }
    }
}

/// An ancestor of a languoid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub name: String,
    pub id: String,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Languoid {
    pub id: String,
    pub name: String,
    pub level: Level,
    pub iso: Option<String>,
    pub macroareas: Vec<String>,
    /// Ancestors from the top-level family down to the parent.
    pub lineage: Vec<Ancestor>,
}

impl Languoid {
    pub fn is_top_level(&self) -> bool {
        self.lineage.is_empty()
    }

    pub fn is_pseudo_family(&self) -> bool {
        PSEUDO_FAMILIES.contains(&self.id.as_str())
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.lineage.last().map(|a| a.id.as_str())
    }

    pub fn family(&self) -> Option<&Ancestor> {
        self.lineage.first()
    }

    /// The languoid itself for languages, the closest language for dialects.
    pub fn language_id(&self) -> Option<&str> {
        match self.level {
            Level::Language => Some(&self.id),
            Level::Dialect => self
                .lineage
                .iter()
                .rev()
                .find(|a| a.level == Level::Language)
                .map(|a| a.id.as_str()),
            Level::Family => None,
        }
    }
}

struct Entry {
    id: String,
    name: String,
    level: Level,
    iso: Option<String>,
    macroareas: Vec<String>,
    ancestors: Vec<String>,
}

fn read_entry(path: &Path, tree_dir: &Path) -> Result<Entry> {
    let dir = path
        .parent()
        .with_context(|| format!("{} has no directory", path.display()))?;
    let relative = dir
        .strip_prefix(tree_dir)
        .with_context(|| format!("{} is outside {}", dir.display(), tree_dir.display()))?;
    let mut ids: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let Some(id) = ids.pop() else {
        bail!("{} is not inside a languoid directory", path.display());
    };

    let ini = Ini::parse(&read_text(path)?)
        .map_err(|message| anyhow::anyhow!("{}: {message}", path.display()))?;
    let name = ini
        .get("core", "name")
        .with_context(|| format!("{}: missing name", path.display()))?
        .to_string();
    let level = ini
        .get("core", "level")
        .with_context(|| format!("{}: missing level", path.display()))?
        .parse::<Level>()
        .map_err(|message| anyhow::anyhow!("{}: {message}", path.display()))?;
    Ok(Entry {
        id,
        name,
        level,
        iso: ini.get("core", "iso639-3").map(str::to_string),
        macroareas: ini.get_list("core", "macroareas"),
        ancestors: ids,
    })
}

/// Read every languoid below `languoids/tree` of a Glottolog clone.
pub fn load_languoids(glottolog: &Path) -> Result<Vec<Languoid>> {
    let tree_dir = glottolog.join(TREE_DIR);
    if !tree_dir.is_dir() {
        bail!("not a Glottolog repository: {} is missing", tree_dir.display());
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(&tree_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", tree_dir.display()))?;
        if entry.file_type().is_file() && entry.file_name() == METADATA_FILE {
            paths.push(entry.into_path());
        }
    }

    let entries = paths
        .iter()
        .map(|path| read_entry(path, &tree_dir))
        .collect::<Result<Vec<_>>>()?;
    let known: BTreeMap<&str, (&str, Level)> = entries
        .iter()
        .map(|e| (e.id.as_str(), (e.name.as_str(), e.level)))
        .collect();

    let languoids = entries
        .iter()
        .map(|entry| {
            let lineage = entry
                .ancestors
                .iter()
                .map(|id| {
                    let (name, level) = known
                        .get(id.as_str())
                        .with_context(|| format!("{}: ancestor {id} without md.ini", entry.id))?;
                    Ok(Ancestor {
                        name: (*name).to_string(),
                        id: id.clone(),
                        level: *level,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Languoid {
                id: entry.id.clone(),
                name: entry.name.clone(),
                level: entry.level,
                iso: entry.iso.clone(),
                macroareas: entry.macroareas.clone(),
                lineage,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(count = languoids.len(), dir = %tree_dir.display(), "loaded languoids");
    Ok(languoids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ancestor(id: &str, level: Level) -> Ancestor {
        Ancestor {
            name: id.to_string(),
            id: id.to_string(),
            level,
        }
    }

    #[test]
    fn dialects_resolve_to_their_language() {
        let dialect = Languoid {
            id: "dial1234".to_string(),
            name: "Dialect".to_string(),
            level: Level::Dialect,
            iso: None,
            macroareas: Vec::new(),
            lineage: vec![
                ancestor("fami1234", Level::Family),
                ancestor("lang1234", Level::Language),
                ancestor("dial1111", Level::Dialect),
            ],
        };
        assert_eq!(dialect.language_id(), Some("lang1234"));
        assert_eq!(dialect.parent_id(), Some("dial1111"));
        assert_eq!(dialect.family().map(|a| a.id.as_str()), Some("fami1234"));
        assert!(!dialect.is_top_level());
    }

    #[test]
    fn levels_parse() {
        assert_eq!("family".parse::<Level>(), Ok(Level::Family));
        assert!("group".parse::<Level>().is_err());
    }
}
