//! Conversion of the mock repository into a dataset package.

mod common;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use dplace_geo::Regions;
use dplace_ingest::Repository;
use dplace_output::schema::METADATA_FILE;
use dplace_output::{
    ConversionOptions, Metadata, Violation, convert_dataset_dir, convert_repository,
    validate_package, write_package,
};
use tempfile::TempDir;

use common::fixture_repos;

fn append(path: &Path, line: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    writeln!(file, "{line}").unwrap();
}

fn regions() -> Regions {
    let square = |name: &str, x0: f64, y0: f64, size: f64| {
        serde_json::json!({
            "type": "Feature",
            "properties": {"LEVEL2_NAM": name},
            "geometry": {"type": "Polygon", "coordinates": [[
                [x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]
            ]]}
        })
    };
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            square("Southern Africa", 10.0, -35.0, 20.0),
            square("New Guinea", 130.0, -10.0, 15.0),
        ]
    });
    Regions::from_geojson(&collection.to_string()).unwrap()
}

#[test]
fn repository_rows() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let conversion = convert_repository(&repos, None, ConversionOptions::default()).unwrap();

    let ids = |ids: Vec<&str>| ids.into_iter().map(str::to_string).collect::<Vec<_>>();
    assert_eq!(
        conversion.datasets.iter().map(|d| d.id.clone()).collect::<Vec<_>>(),
        ids(vec!["EA", "Binford"])
    );
    assert_eq!(conversion.languages.len(), 3);
    assert_eq!(conversion.languages[0].hraf_id.as_deref(), Some("FX10"));
    assert_eq!(conversion.languages[0].region, None);

    let codes: Vec<_> = conversion.codes.iter().map(|c| (c.id.as_str(), c.ord)).collect();
    assert_eq!(
        codes,
        vec![
            ("EA001-0", Some(0)),
            ("EA001-1", Some(1)),
            ("B001-1", Some(1)),
            ("B001-2", Some(2)),
        ]
    );

    let values: Vec<_> = conversion
        .values
        .iter()
        .map(|v| (v.id.as_str(), v.code_id.as_deref()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("EA-1", Some("EA001-1")),
            ("EA-2", Some("EA001-0")),
            ("EA-3", None),
            ("Binford-1", Some("B001-2")),
        ]
    );
    assert_eq!(conversion.values[1].source, vec!["meier2001[10-15]", "smith1990"]);
    assert_eq!(conversion.values[3].source, vec!["smith1990[7]"]);

    // Only cited entries, in order of first citation.
    assert_eq!(
        conversion.sources.keys().collect::<Vec<_>>(),
        vec!["meier2001", "smith1990"]
    );
}

#[test]
fn relations_split_internal_and_external_ids() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let conversion = convert_repository(&repos, None, ConversionOptions::default()).unwrap();

    let relations = &conversion.relations;
    assert_eq!(relations.len(), 2);
    assert_eq!(relations[0].id, "1");
    assert_eq!(relations[0].society_id, "Aa1");
    assert_eq!(relations[0].related_society_id.as_deref(), Some("B1"));
    assert_eq!(relations[0].related_society_external_id, None);
    assert_eq!(relations[1].id, "2");
    assert_eq!(relations[1].related_society_id, None);
    assert_eq!(relations[1].related_society_external_id.as_deref(), Some("2"));
    assert_eq!(relations[1].related_society_dataset, "SCCS");
}

#[test]
fn missing_code_has_no_code_id() {
    let dir = fixture_repos();
    append(&dir.path().join("datasets/EA/data.csv"), "Aa1,,1950,EA001,NA,,,,");
    let repos = Repository::new(dir.path());
    let conversion = convert_repository(&repos, None, ConversionOptions::default()).unwrap();
    let value = &conversion.values[3];
    assert_eq!(value.id, "EA-4");
    assert_eq!(value.value.as_deref(), Some("NA"));
    assert_eq!(value.code_id, None);
}

#[test]
fn written_package_validates() {
    let dir = fixture_repos();
    let out = TempDir::new().unwrap();
    let repos = Repository::new(dir.path());
    let conversion = convert_repository(&repos, Some(&regions()), ConversionOptions::default()).unwrap();
    assert_eq!(conversion.languages[1].region.as_deref(), Some("New Guinea"));

    write_package(&conversion, out.path(), Some(&repos.path("LICENSE.txt"))).unwrap();
    for file in [
        "datasets.csv",
        "societies.csv",
        "variables.csv",
        "codes.csv",
        "data.csv",
        "society_relations.csv",
        "sources.bib",
        "LICENSE.txt",
    ] {
        assert!(out.path().join(file).exists(), "{file}");
    }

    let metadata: Metadata =
        serde_json::from_str(&fs::read_to_string(out.path().join(METADATA_FILE)).unwrap()).unwrap();
    assert_eq!(metadata.tables.len(), 6);
    let data = metadata.table("data.csv").unwrap();
    assert_eq!(data.table_schema.foreign_keys.len(), 4);

    let societies = fs::read_to_string(out.path().join("societies.csv")).unwrap();
    assert!(societies.contains("San;Ju/'hoansi"));

    assert_eq!(validate_package(out.path()).unwrap(), Vec::<Violation>::new());
}

#[test]
fn dangling_code_is_reported_unless_fixed() {
    let dir = fixture_repos();
    append(&dir.path().join("datasets/EA/data.csv"), "Aa1,,1950,EA001,5,,,,");

    let repos = Repository::new(dir.path());
    let out = TempDir::new().unwrap();
    let conversion = convert_repository(&repos, None, ConversionOptions::default()).unwrap();
    assert_eq!(conversion.values[3].code_id.as_deref(), Some("EA001-5"));
    write_package(&conversion, out.path(), None).unwrap();
    assert_eq!(
        validate_package(out.path()).unwrap(),
        vec![Violation::DanglingReference {
            table: "data.csv".to_string(),
            column: "Code_ID".to_string(),
            value: "EA001-5".to_string(),
            target: "codes.csv".to_string(),
        }]
    );

    let options = ConversionOptions {
        fix_codes: true,
        ..ConversionOptions::default()
    };
    let fixed = convert_repository(&repos, None, options).unwrap();
    assert_eq!(fixed.values[3].code_id, None);
    write_package(&fixed, out.path(), None).unwrap();
    assert!(validate_package(out.path()).unwrap().is_empty());
}

#[test]
fn uncited_bibliography_key_is_reported() {
    let dir = fixture_repos();
    let repos = Repository::new(dir.path());
    let out = TempDir::new().unwrap();
    let mut conversion = convert_repository(&repos, None, ConversionOptions::default()).unwrap();
    conversion.values[0].source.push("nobody1900[3]".to_string());
    write_package(&conversion, out.path(), None).unwrap();
    assert_eq!(
        validate_package(out.path()).unwrap(),
        vec![Violation::UnknownSource {
            table: "data.csv".to_string(),
            key: "nobody1900".to_string(),
        }]
    );
}

#[test]
fn dataset_directory_maps_values_to_code_names() {
    let dir = fixture_repos();
    let raw = dir.path().join("datasets/Binford");
    fs::copy(dir.path().join("datasets/sources.bib"), raw.join("sources.bib")).unwrap();
    append(&raw.join("data.csv"), "B1,,NA,B001,NA,,,,");

    let conversion = convert_dataset_dir(&raw, None, ConversionOptions::default()).unwrap();
    assert_eq!(conversion.title, "D-PLACE dataset derived from Binford");
    assert_eq!(conversion.datasets[0].id, "Binford");

    let first = &conversion.values[0];
    assert_eq!(first.id, "1");
    assert_eq!(first.value.as_deref(), Some("Mobile"));
    assert_eq!(first.code_id.as_deref(), Some("B001-2"));
    let second = &conversion.values[1];
    assert_eq!(second.id, "2");
    assert_eq!(second.value, None);
    assert_eq!(second.year, None);
    assert_eq!(second.code_id, None);

    let out = TempDir::new().unwrap();
    write_package(&conversion, out.path(), None).unwrap();
    assert!(validate_package(out.path()).unwrap().is_empty());
}

#[test]
fn continuous_variable_ignores_stray_codes() {
    let dir = fixture_repos();
    let ea = dir.path().join("datasets/EA");
    append(&ea.join("codes.csv"), "EA202,1,,Small");
    append(&ea.join("data.csv"), "Aa1,,1950,EA202,1,,,,");

    let repos = Repository::new(dir.path());
    let conversion = convert_repository(&repos, None, ConversionOptions::default()).unwrap();
    assert!(conversion.codes.iter().all(|c| c.parameter_id != "EA202"));
    let value = &conversion.values[3];
    assert_eq!(value.value.as_deref(), Some("1"));
    assert_eq!(value.code_id, None);
}

#[test]
fn dataset_directory_reads_readme_as_description() {
    let dir = fixture_repos();
    let raw = dir.path().join("datasets/Binford");
    fs::write(raw.join("README.md"), "# Binford\n\nHunter-gatherer sample.\n").unwrap();

    let conversion = convert_dataset_dir(&raw, None, ConversionOptions::default()).unwrap();
    assert_eq!(conversion.datasets[0].description, "# Binford\n\nHunter-gatherer sample.\n");

    fs::remove_file(raw.join("README.md")).unwrap();
    fs::create_dir(raw.join("README.md")).unwrap();
    let error = convert_dataset_dir(&raw, None, ConversionOptions::default()).unwrap_err();
    assert!(format!("{error:#}").starts_with("read dataset description: failed to read file"));
}
