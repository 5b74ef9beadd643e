use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

use dplace_model::{PhylogenyInfo, Taxon};

use crate::csv::read_dicts;
use crate::dataset::cached;
use crate::error::{IngestError, Result};
use crate::paths;
use crate::tree::{NexusFile, Tree};

/// A summary tree plus the taxa mapping its leaves to societies.
#[derive(Debug)]
pub struct Phylogeny {
    pub info: PhylogenyInfo,
    dir: PathBuf,
    taxa: OnceCell<Vec<Taxon>>,
}

impl Phylogeny {
    pub fn new(info: PhylogenyInfo, base_dir: &Path) -> Self {
        let dir = base_dir.join(&info.source.id);
        Self {
            info,
            dir,
            taxa: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.info.source.id
    }

    pub fn name(&self) -> &str {
        &self.info.source.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_glottolog(&self) -> bool {
        self.info.is_glottolog()
    }

    pub fn trees_path(&self) -> PathBuf {
        self.dir.join(paths::SUMMARY_TREES)
    }

    pub fn taxa(&self) -> Result<&[Taxon]> {
        cached(&self.taxa, || {
            let path = self.dir.join(paths::TAXA_CSV);
            let table = read_dicts(&path)?;
            table
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    Taxon::from_row(row).map_err(|source| IngestError::Record {
                        path: path.clone(),
                        row: i + 1,
                        source,
                    })
                })
                .collect()
        })
        .map(Vec::as_slice)
    }

    pub fn nexus(&self) -> Result<NexusFile> {
        NexusFile::load(&self.trees_path())
    }

    /// Newick string of the first tree in the summary file.
    pub fn newick(&self) -> Result<String> {
        let path = self.trees_path();
        self.nexus()?
            .first_newick()
            .ok_or_else(|| IngestError::Nexus {
                path,
                message: "TREES block contains no tree".to_string(),
            })
    }

    pub fn tree(&self) -> Result<Tree> {
        Tree::parse(&self.newick()?)
    }
}

impl fmt::Display for Phylogeny {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info.source)
    }
}
