//! Societies and the relations between societies of different datasets.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::fields::{self, Row, RowReader};
use crate::record::Record;

/// Reference to a culture in the eHRAF World Cultures database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrafReference {
    pub name: String,
    /// Empty when the source string carried no parenthesized id.
    pub id: String,
}

static HRAF_NAME_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.*?)\s*\((?P<id>[^()]+)\)$").expect("static HRAF pattern compiles")
});

static HRAF_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<id>[A-Z]+[0-9]+)(/[A-Z0-9]+)?$").expect("static HRAF id pattern compiles")
});

impl HrafReference {
    /// Parse `"Name (ID)"`; a string without a trailing `(ID)` is kept as a name.
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        match HRAF_NAME_ID_RE.captures(value) {
            Some(caps) => Some(Self {
                name: caps["name"].to_string(),
                id: caps["id"].to_string(),
            }),
            None => Some(Self {
                name: value.to_string(),
                id: String::new(),
            }),
        }
    }

    /// The culture id without any `/SUBID` suffix, if it looks like an HRAF id.
    pub fn culture_id(&self) -> Option<&str> {
        HRAF_ID_RE
            .captures(&self.id)
            .and_then(|caps| caps.name("id"))
            .map(|m| m.as_str())
    }
}

impl fmt::Display for HrafReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_empty() {
            write!(f, "{}", self.name)
        } else if self.name.is_empty() {
            write!(f, "({})", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// A cultural group at a focal location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Society {
    pub id: String,
    pub xd_id: String,
    pub pref_name_for_society: String,
    pub glottocode: String,
    pub orig_name_and_id_in_this_dataset: String,
    pub alt_names_by_society: Vec<String>,
    pub main_focal_year: String,
    pub hraf_name_id: Option<HrafReference>,
    pub hraf_link: String,
    pub orig_lat: f64,
    /// Uncorrected longitudes may extend past -180 in the Pacific.
    pub orig_long: f64,
    pub lat: f64,
    pub long: f64,
    pub comment: String,
    pub glottocode_comment: String,
}

impl Society {
    pub fn has_glottocode(&self) -> bool {
        !self.glottocode.is_empty()
    }
}

impl fmt::Display for Society {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.pref_name_for_society, self.id)
    }
}

impl Record for Society {
    const NAME: &'static str = "Society";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "xd_id",
        "pref_name_for_society",
        "glottocode",
        "ORIG_name_and_ID_in_this_dataset",
        "alt_names_by_society",
        "main_focal_year",
        "HRAF_name_ID",
        "HRAF_link",
        "origLat",
        "origLong",
        "Lat",
        "Long",
        "Comment",
        "glottocode_comment",
    ];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        r.only(Self::FIELDS)?;
        Ok(Self {
            id: fields::society_id("id", r.required("id")?)?,
            xd_id: fields::xd_id("xd_id", r.required("xd_id")?)?,
            pref_name_for_society: r.required("pref_name_for_society")?.to_string(),
            glottocode: fields::glottocode("glottocode", r.required("glottocode")?)?,
            orig_name_and_id_in_this_dataset: r
                .required("ORIG_name_and_ID_in_this_dataset")?
                .to_string(),
            alt_names_by_society: fields::comma_split(r.required("alt_names_by_society")?),
            main_focal_year: r.required("main_focal_year")?.to_string(),
            hraf_name_id: HrafReference::parse(r.required("HRAF_name_ID")?),
            hraf_link: fields::hraf_link("HRAF_link", r.required("HRAF_link")?)?,
            orig_lat: fields::float("origLat", r.required("origLat")?)?,
            orig_long: fields::float("origLong", r.required("origLong")?)?,
            lat: fields::float_in_range("Lat", r.required("Lat")?, -90.0, 90.0)?,
            long: fields::float_in_range("Long", r.required("Long")?, -180.0, 180.0)?,
            comment: r.required("Comment")?.to_string(),
            glottocode_comment: r.required("glottocode_comment")?.to_string(),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.xd_id.clone(),
            self.pref_name_for_society.clone(),
            self.glottocode.clone(),
            self.orig_name_and_id_in_this_dataset.clone(),
            fields::comma_join(&self.alt_names_by_society),
            self.main_focal_year.clone(),
            self.hraf_name_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            self.hraf_link.clone(),
            fields::format_float(self.orig_lat),
            fields::format_float(self.orig_long),
            fields::format_float(self.lat),
            fields::format_float(self.long),
            self.comment.clone(),
            self.glottocode_comment.clone(),
        ]
    }
}

static RELATED_SOCIETY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+):\s*([^\[]+)\[([^\]]+)\]$").expect("static relation pattern compiles")
});

/// A society of another (or the same) dataset that represents the same group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedSociety {
    pub dataset: String,
    pub name: String,
    pub id: String,
}

impl RelatedSociety {
    /// Parse `"Dataset: Name [ID]"`. Anything else is malformed source data.
    pub fn from_string(value: &str) -> Result<Self> {
        let caps = RELATED_SOCIETY_RE
            .captures(value)
            .ok_or_else(|| ValidationError::RelatedSociety {
                value: value.to_string(),
            })?;
        Ok(Self {
            dataset: caps[1].trim().to_string(),
            name: caps[2].trim().to_string(),
            id: caps[3].trim().to_string(),
        })
    }
}

impl fmt::Display for RelatedSociety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.dataset, self.name, self.id)
    }
}

/// One row of `societies_mapping.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedSocieties {
    pub id: String,
    pub related: Vec<RelatedSociety>,
}

impl Record for RelatedSocieties {
    const NAME: &'static str = "RelatedSocieties";
    const FIELDS: &'static [&'static str] = &["id", "related"];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        r.only(Self::FIELDS)?;
        let related = fields::semicolon_split(r.required("related")?)
            .iter()
            .map(|item| RelatedSociety::from_string(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: r.required("id")?.to_string(),
            related,
        })
    }

    fn to_row(&self) -> Vec<String> {
        let related: Vec<String> = self.related.iter().map(ToString::to_string).collect();
        vec![self.id.clone(), fields::semicolon_join(&related)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hraf_reference_parses_name_and_id() {
        let hraf = HrafReference::parse("Kapauku (OJ29)").unwrap();
        assert_eq!(hraf.name, "Kapauku");
        assert_eq!(hraf.id, "OJ29");
        assert_eq!(hraf.culture_id(), Some("OJ29"));
        assert_eq!(hraf.to_string(), "Kapauku (OJ29)");
    }

    #[test]
    fn hraf_reference_keeps_unparseable_text_as_name() {
        let hraf = HrafReference::parse("unknown").unwrap();
        assert_eq!(hraf.id, "");
        assert_eq!(hraf.culture_id(), None);
        assert_eq!(hraf.to_string(), "unknown");
        assert!(HrafReference::parse("").is_none());
    }

    #[test]
    fn hraf_culture_id_strips_subid() {
        let hraf = HrafReference::parse("Aranda (OI08/OI8A)").unwrap();
        assert_eq!(hraf.culture_id(), Some("OI08"));
    }

    #[test]
    fn related_society_parses() {
        let related = RelatedSociety::from_string("Dataset: name [id]").unwrap();
        assert_eq!(related.dataset, "Dataset");
        assert_eq!(related.name, "name");
        assert_eq!(related.id, "id");
        assert_eq!(related.to_string(), "Dataset: name [id]");
    }

    #[test]
    fn related_society_without_brackets_is_an_error() {
        assert!(matches!(
            RelatedSociety::from_string("Dataset: name"),
            Err(ValidationError::RelatedSociety { .. })
        ));
    }
}
