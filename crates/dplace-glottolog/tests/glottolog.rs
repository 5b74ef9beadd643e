mod common;

use std::fs;
use std::path::Path;

use dplace_glottolog::lgcode::LGCODE_FIELD;
use dplace_glottolog::{Release, annotate_sources, load_languoids, update};
use dplace_ingest::csv::read_dicts;
use dplace_ingest::{Repository, paths};
use tempfile::TempDir;

fn write_languoid(root: &Path, path: &str, md: &str) {
    let dir = root.join("languoids/tree").join(path);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("md.ini"), md).unwrap();
}

/// A Glottolog clone with two families, an isolate and Bookkeeping.
fn glottolog_clone() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_languoid(root, "kxaa1236", "[core]\nname = Kxa\nlevel = family\n");
    write_languoid(
        root,
        "kxaa1236/juho1239",
        "[core]\nname = Ju'hoan\nlevel = language\niso639-3 = ktz\nmacroareas =\n\tAfrica\n",
    );
    write_languoid(
        root,
        "nucl1709",
        "[core]\nname = Nuclear Trans New Guinea\nlevel = family\n",
    );
    write_languoid(
        root,
        "nucl1709/ekar1243",
        "[core]\nname = Ekari\nlevel = language\niso639-3 = ekg\nmacroareas =\n\tPapunesia\n",
    );
    write_languoid(
        root,
        "nucl1709/ekar1243/wodn1234",
        "[core]\nname = Wodani\nlevel = dialect\n",
    );
    write_languoid(root, "zuni1245", "[core]\nname = Zuni\nlevel = language\n");
    write_languoid(root, "book1242", "[core]\nname = Bookkeeping\nlevel = family\n");
    write_languoid(
        root,
        "book1242/bkpp1234",
        "[core]\nname = Spurious\nlevel = language\n",
    );
    dir
}

fn release() -> Release {
    Release {
        title: "Glottolog 5.0".to_string(),
        year: "2024".to_string(),
    }
}

#[test]
fn languoids_carry_lineage_from_the_directory_tree() {
    let glottolog = glottolog_clone();
    let languoids = load_languoids(glottolog.path()).unwrap();
    assert_eq!(languoids.len(), 8);

    let dialect = languoids.iter().find(|l| l.id == "wodn1234").unwrap();
    let lineage: Vec<&str> = dialect.lineage.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(lineage, vec!["nucl1709", "ekar1243"]);
    assert_eq!(dialect.language_id(), Some("ekar1243"));
    assert_eq!(dialect.family().unwrap().name, "Nuclear Trans New Guinea");
}

#[test]
fn missing_languoid_tree_is_an_error() {
    let empty = TempDir::new().unwrap();
    assert!(load_languoids(empty.path()).is_err());
}

#[test]
fn update_writes_languoid_table() {
    let repos_dir = common::fixture_repos();
    let glottolog = glottolog_clone();
    let repos = Repository::new(repos_dir.path());

    let summary = update(&repos, glottolog.path(), &release()).unwrap();
    assert_eq!(summary.languoids, 8);

    let table = read_dicts(&repos.path(paths::GLOTTOLOG_CSV)).unwrap();
    assert_eq!(
        table.header,
        vec![
            "id",
            "name",
            "family_id",
            "family_name",
            "iso_code",
            "language_id",
            "macroarea",
            "lineage",
            "level"
        ]
    );
    let ids: Vec<&str> = table.rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "bkpp1234", "book1242", "ekar1243", "juho1239", "kxaa1236", "nucl1709", "wodn1234",
            "zuni1245"
        ]
    );
    let ekari = &table.rows[2];
    assert_eq!(ekari["family_id"], "nucl1709");
    assert_eq!(ekari["family_name"], "Nuclear Trans New Guinea");
    assert_eq!(ekari["iso_code"], "ekg");
    assert_eq!(ekari["language_id"], "ekar1243");
    assert_eq!(ekari["macroarea"], "Papunesia");
    assert_eq!(ekari["lineage"], "nucl1709");
    let wodani = &table.rows[6];
    assert_eq!(wodani["language_id"], "ekar1243");
    assert_eq!(wodani["lineage"], "nucl1709/ekar1243");
    assert_eq!(wodani["level"], "dialect");
    let family = &table.rows[4];
    assert_eq!(family["language_id"], "");
    assert_eq!(family["family_id"], "");
}

#[test]
fn update_regenerates_classification_trees() {
    let repos_dir = common::fixture_repos();
    let stale = repos_dir.path().join("phylogenies/glottolog_stal1234");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join(paths::TAXA_CSV), "taxon\n").unwrap();
    let glottolog = glottolog_clone();

    let summary = update(&Repository::new(repos_dir.path()), glottolog.path(), &release()).unwrap();
    assert_eq!(
        summary.trees,
        vec!["glottolog_kxaa1236", "glottolog_nucl1709", "glottolog_global"]
    );
    assert!(!stale.exists());

    let family_trees = repos_dir.path().join("phylogenies/glottolog_kxaa1236/summary.trees");
    assert_eq!(
        fs::read_to_string(family_trees).unwrap(),
        "#NEXUS\nBegin trees;\n    tree glottolog_kxaa1236 = (juho1239:1);\nend;\n"
    );

    let repos = Repository::new(repos_dir.path());
    let global = repos.phylogeny("glottolog_global").unwrap().unwrap();
    let mut leaves = global.tree().unwrap().leaf_names();
    leaves.sort();
    assert_eq!(leaves, vec!["ekar1243", "juho1239"]);

    let taxa = global.taxa().unwrap();
    assert_eq!(taxa.len(), 2);
    let juhoan = taxa.iter().find(|t| t.taxon == "juho1239").unwrap();
    assert_eq!(juhoan.glottocode, "juho1239");
    assert_eq!(juhoan.xd_ids, vec!["xd1"]);
    assert_eq!(juhoan.soc_ids, vec!["Aa1", "B1"]);
}

#[test]
fn update_merges_phylogeny_index() {
    let repos_dir = common::fixture_repos();
    let glottolog = glottolog_clone();
    let index_path = repos_dir.path().join(paths::PHYLOGENIES_INDEX);

    update(&Repository::new(repos_dir.path()), glottolog.path(), &release()).unwrap();
    let index = read_dicts(&index_path).unwrap();
    let ids: Vec<&str> = index.rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "gray_et_al2009",
            "glottolog_global",
            "glottolog_kxaa1236",
            "glottolog_nucl1709"
        ]
    );
    let kxa = &index.rows[2];
    assert_eq!(kxa["name"], "Kxa (Glottolog 5.0)");
    assert_eq!(kxa["author"], "Glottolog 5.0 (Kxa)");
    assert_eq!(kxa["year"], "2024");
    assert_eq!(kxa["scaling"], "");
    assert_eq!(kxa["url"], "https://glottolog.org/resource/languoid/id/kxaa1236");
    assert_eq!(index.rows[1]["author"], "Glottolog 5.0");
    assert_eq!(index.rows[0]["author"], "Gray et al.");

    let newer = Release {
        title: "Glottolog 5.1".to_string(),
        year: "2025".to_string(),
    };
    update(&Repository::new(repos_dir.path()), glottolog.path(), &newer).unwrap();
    let index = read_dicts(&index_path).unwrap();
    let ids: Vec<&str> = index.rows.iter().map(|r| r["id"].as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "glottolog_global",
            "glottolog_kxaa1236",
            "glottolog_nucl1709",
            "gray_et_al2009"
        ]
    );
    assert_eq!(index.rows[0]["name"], "Global Classification (Glottolog 5.1)");
}

#[test]
fn cited_entries_get_lgcode_annotations() {
    let repos_dir = common::fixture_repos();
    let repos = Repository::new(repos_dir.path());

    let (sources, annotated) = annotate_sources(&repos).unwrap();
    assert_eq!(annotated, 2);
    assert_eq!(
        sources.get("meier2001").unwrap().get(LGCODE_FIELD),
        Some("!Kung [juho1239], Kapauku [ekar1243]")
    );
    assert_eq!(
        sources.get("smith1990").unwrap().get(LGCODE_FIELD),
        Some("!Kung [juho1239], Kapauku [ekar1243]")
    );
    assert_eq!(sources.get("unused2000").unwrap().get(LGCODE_FIELD), None);
}
