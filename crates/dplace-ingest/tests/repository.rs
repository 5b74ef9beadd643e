//! Repository access against the mock data checkout.

mod common;

use std::fs;

use dplace_ingest::{DataFilter, IngestError, Repository};
use dplace_model::{Data, VariableType};

use common::fixture_repos;

#[test]
fn datasets_and_phylogenies_are_indexed() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());

    let datasets = repos.datasets().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0].to_string(), "Ethnographic Atlas (EA)");
    assert_eq!(repos.phylogenies().unwrap().len(), 1);
    assert!(repos.dataset("Binford").unwrap().is_some());
    assert!(repos.dataset("WNAI").unwrap().is_none());
}

#[test]
fn empty_description_falls_back_to_readme() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let ea = repos.dataset("EA").unwrap().unwrap();
    assert_eq!(ea.info.description, "Coded data on 1291 societies.\n");
    let binford = repos.dataset("Binford").unwrap().unwrap();
    assert_eq!(binford.info.description, "Hunter-gatherer societies");
}

#[test]
fn merged_views_count_every_society() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let total: usize = repos
        .datasets()
        .unwrap()
        .iter()
        .map(|ds| ds.societies().unwrap().len())
        .sum();
    assert_eq!(repos.societies().unwrap().len(), total);
    assert_eq!(repos.variables().unwrap().len(), 3);
}

#[test]
fn variables_carry_their_codes() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let variables = repos.variables().unwrap();
    let gathering = &variables["EA001"];
    assert_eq!(gathering.var_type, VariableType::Ordinal);
    assert_eq!(gathering.codes.len(), 3);
    assert!(variables["EA202"].codes.is_empty());
}

#[test]
fn continuous_variable_keeps_stray_codes_through_write() {
    let dir = fixture_repos();
    let codes = dir.path().join("datasets/EA/codes.csv");
    let mut text = fs::read_to_string(&codes).unwrap();
    text.push_str("EA202,1,,Small\n");
    fs::write(&codes, &text).unwrap();

    let mut repos = Repository::new(dir.path());
    let population = &repos.variables().unwrap()["EA202"];
    assert_eq!(population.var_type, VariableType::Continuous);
    assert!(!population.var_type.has_codes());
    assert_eq!(population.codes.len(), 1);

    let ea = repos.dataset_mut("EA").unwrap().unwrap();
    let variables = ea.variables().unwrap().to_vec();
    ea.set_variables(variables);
    repos.write().unwrap();
    assert_eq!(fs::read_to_string(&codes).unwrap(), text);
}

#[test]
fn references_are_parsed() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let ea = repos.dataset("EA").unwrap().unwrap();
    let record = &ea.data().unwrap()[1];
    assert_eq!(record.references.len(), 2);
    assert_eq!(record.references[0].to_string(), "meier2001:10-15");
    assert!(repos.sources().unwrap().contains("smith1990"));
}

fn soc_ids<'a>(records: impl Iterator<Item = &'a Data>) -> Vec<&'a str> {
    records.map(|d| d.soc_id.as_str()).collect()
}

#[test]
fn iter_data_filters() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());

    let all = repos.iter_data(DataFilter::new()).unwrap();
    assert_eq!(all.iter().count(), 4);
    // Re-iterable.
    assert_eq!(all.iter().count(), 4);

    let ea = repos.iter_data(DataFilter::new().datasets(["EA"])).unwrap();
    assert_eq!(soc_ids(ea.iter()), vec!["Aa1", "Ec3", "Ec3"]);

    let gathering = repos
        .iter_data(DataFilter::new().variables(["EA001"]).societies(["Ec3"]))
        .unwrap();
    assert_eq!(gathering.iter().count(), 1);
}

#[test]
fn iter_data_empty_filters() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());

    // An empty dataset list selects nothing.
    let none = repos
        .iter_data(DataFilter::new().datasets(Vec::<String>::new()))
        .unwrap();
    assert_eq!(none.iter().count(), 0);

    // Empty variable and society lists do not restrict.
    let unrestricted = repos
        .iter_data(
            DataFilter::new()
                .datasets(["EA"])
                .societies(Vec::<String>::new())
                .variables(Vec::<String>::new()),
        )
        .unwrap();
    assert_eq!(unrestricted.iter().count(), 3);
}

#[test]
fn unchanged_write_reproduces_bytes() {
    let dir = fixture_repos();
    let tables = ["societies.csv", "variables.csv", "codes.csv", "data.csv"];
    let before: Vec<Vec<u8>> = tables
        .iter()
        .map(|t| fs::read(dir.path().join("datasets/EA").join(t)).unwrap())
        .collect();
    let mapping_before = fs::read(dir.path().join("datasets/EA/societies_mapping.csv")).unwrap();

    let repos = Repository::new(dir.path());
    repos.datasets().unwrap();
    repos.write().unwrap();

    for (table, bytes) in tables.iter().zip(before) {
        let after = fs::read(dir.path().join("datasets/EA").join(table)).unwrap();
        assert_eq!(
            String::from_utf8(after).unwrap(),
            String::from_utf8(bytes).unwrap(),
            "{table}"
        );
    }
    assert_eq!(
        fs::read(dir.path().join("datasets/EA/societies_mapping.csv")).unwrap(),
        mapping_before
    );
    // Binford has no relations file and none is created.
    assert!(!dir.path().join("datasets/Binford/societies_mapping.csv").exists());
}

#[test]
fn unchanged_write_keeps_reference_spelling() {
    let dir = fixture_repos();
    let data = dir.path().join("datasets/EA/data.csv");
    let text = "soc_id,sub_case,year,var_id,code,comment,references,source_coded_data,admin_comment\n\
                Aa1,,1950,EA001,1,,meier2001[10-15];smith1990,,\n\
                Ec3,,1955,EA001,0,,smith1990: 3 ; meier2001,,\n";
    fs::write(&data, text).unwrap();

    let repos = Repository::new(dir.path());
    let records = repos.dataset("EA").unwrap().unwrap().data().unwrap();
    assert_eq!(records[0].references[0].pages, "10-15");
    repos.write().unwrap();

    assert_eq!(fs::read_to_string(&data).unwrap(), text);
}

#[test]
fn mutation_is_visible_after_write() {
    let dir = fixture_repos();
    let mut repos = Repository::new(dir.path());
    {
        let ea = repos.dataset_mut("EA").unwrap().unwrap();
        let mut societies = ea.societies().unwrap().to_vec();
        societies[1].pref_name_for_society = "Ekagi".to_string();
        ea.set_societies(societies);
    }
    assert_eq!(repos.societies().unwrap()["Ec3"].pref_name_for_society, "Ekagi");
    repos.write().unwrap();

    let reloaded = Repository::new(dir.path());
    assert_eq!(
        reloaded.societies().unwrap()["Ec3"].pref_name_for_society,
        "Ekagi"
    );
}

#[test]
fn phylogeny_newick_is_translated() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let phylogeny = repos.phylogeny("gray_et_al2009").unwrap().unwrap();
    assert!(!phylogeny.is_glottolog());
    assert_eq!(phylogeny.newick().unwrap(), "(Kapauku:1,Kung:1);");
    assert_eq!(phylogeny.tree().unwrap().leaf_names(), vec!["Kapauku", "Kung"]);
    let taxa = phylogeny.taxa().unwrap();
    assert_eq!(taxa[1].soc_ids, vec!["Aa1", "B1"]);
}

#[test]
fn invalid_row_fails_the_load() {
    let dir = fixture_repos();
    fs::write(
        dir.path().join("datasets/Binford/societies.csv"),
        "id,xd_id\nB1,x1\n",
    )
    .unwrap();
    let repos = Repository::new(dir.path());
    let err = repos.societies().unwrap_err();
    assert!(matches!(err, IngestError::Record { row: 1, .. }));
}
