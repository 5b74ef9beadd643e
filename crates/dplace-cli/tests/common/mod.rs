use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub fn mockdata_repos() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../mockdata/repos")
}

/// A writable copy of the mock repository.
pub fn fixture_repos() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    copy_dir(&mockdata_repos(), dir.path());
    dir
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("create dir");
    for entry in fs::read_dir(from).expect("read dir") {
        let entry = entry.expect("dir entry");
        let target = to.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("copy file");
        }
    }
}
