//! Construction and serialization of dplace-model records.

use dplace_model::{Record, RelatedSociety, Row, Society, ValidationError, row};
use proptest::prelude::*;

fn society_row(id: &str, lat: &str, long: &str) -> Row {
    row([
        ("id", id),
        ("xd_id", "xd1"),
        ("pref_name_for_society", "Kapauku"),
        ("glottocode", "ekar1243"),
        ("ORIG_name_and_ID_in_this_dataset", "Kapauku (Ec3)"),
        ("alt_names_by_society", "Ekari, Ekagi"),
        ("main_focal_year", "1955"),
        ("HRAF_name_ID", "Kapauku (OJ29)"),
        ("HRAF_link", "in process"),
        ("origLat", "-4"),
        ("origLong", "136.5"),
        ("Lat", lat),
        ("Long", long),
        ("Comment", ""),
        ("glottocode_comment", ""),
    ])
}

#[test]
fn society_round_trips_its_row() {
    let fields = society_row("Ec3", "-4", "136.5");
    let society = Society::from_row(&fields).expect("valid society");
    let written = society.to_row();
    let expected: Vec<String> = Society::FIELDS
        .iter()
        .map(|field| fields[*field].clone())
        .collect();
    assert_eq!(written, expected);
    assert_eq!(society.to_string(), "Kapauku (Ec3)");
}

#[test]
fn society_coordinates_are_range_checked() {
    let err = Society::from_row(&society_row("Ec3", "91", "0")).unwrap_err();
    assert!(matches!(err, ValidationError::Range { field: "Lat", .. }));
    let err = Society::from_row(&society_row("Ec3", "0", "-180.5")).unwrap_err();
    assert!(matches!(err, ValidationError::Range { field: "Long", .. }));
}

#[test]
fn society_id_needs_two_characters() {
    let err = Society::from_row(&society_row("E", "0", "0")).unwrap_err();
    assert!(matches!(err, ValidationError::Pattern { field: "id", .. }));
}

#[test]
fn malformed_related_society_is_fatal() {
    assert!(RelatedSociety::from_string("EA: Kapauku Ec3").is_err());
}

proptest! {
    #[test]
    fn society_construction_is_deterministic(
        id in "[A-Za-z][A-Za-z0-9]{1,6}",
        lat in -90.0f64..=90.0,
        long in -180.0f64..=180.0,
    ) {
        let fields = society_row(&id, &lat.to_string(), &long.to_string());
        let first = Society::from_row(&fields).expect("valid society");
        let second = Society::from_row(&fields).expect("valid society");
        prop_assert_eq!(first, second);
    }
}
