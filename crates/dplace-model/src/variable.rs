use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::fields::{self, Row, RowReader};
use crate::record::Record;

/// Sentinel code for missing data.
pub const NA: &str = "NA";

/// Measurement scale of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    Continuous,
    Categorical,
    Ordinal,
}

impl VariableType {
    pub const ALL: &'static [&'static str] = &["Continuous", "Categorical", "Ordinal"];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Continuous => "Continuous",
            VariableType::Categorical => "Categorical",
            VariableType::Ordinal => "Ordinal",
        }
    }

    /// Categorical and ordinal variables are coded against a list of codes.
    pub fn has_codes(&self) -> bool {
        matches!(self, VariableType::Categorical | VariableType::Ordinal)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Continuous" => Ok(VariableType::Continuous),
            "Categorical" => Ok(VariableType::Categorical),
            "Ordinal" => Ok(VariableType::Ordinal),
            _ => Err(ValidationError::Choice {
                field: "type",
                value: s.to_string(),
                allowed: Self::ALL,
            }),
        }
    }
}

/// A labeled category value of a categorical or ordinal variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub var_id: String,
    pub code: String,
    pub description: String,
    pub name: String,
}

impl Code {
    pub fn id(&self) -> String {
        format!("{}-{}", self.var_id, self.code)
    }

    pub fn is_na(&self) -> bool {
        self.code == NA
    }
}

impl Record for Code {
    const NAME: &'static str = "Code";
    const FIELDS: &'static [&'static str] = &["var_id", "code", "description", "name"];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        Ok(Self {
            var_id: fields::variable_id("var_id", r.required("var_id")?)?,
            code: r.required("code")?.to_string(),
            description: r.optional("description").to_string(),
            name: r.required("name")?.to_string(),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.var_id.clone(),
            self.code.clone(),
            self.description.clone(),
            self.name.clone(),
        ]
    }
}

/// A cultural or environmental feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub category: Vec<String>,
    pub title: String,
    pub definition: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    pub units: String,
    pub source: String,
    pub changes: String,
    pub notes: String,
    /// Rows of `codes.csv` for this id, whatever the type. Only categorical and
    /// ordinal variables give them meaning; see [`VariableType::has_codes`].
    #[serde(default)]
    pub codes: Vec<Code>,
}

impl Variable {
    pub fn with_codes(mut self, codes: Vec<Code>) -> Self {
        self.codes = codes;
        self
    }

    pub fn code(&self, code: &str) -> Option<&Code> {
        self.codes.iter().find(|c| c.code == code)
    }
}

impl Record for Variable {
    const NAME: &'static str = "Variable";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "category",
        "title",
        "definition",
        "type",
        "units",
        "source",
        "changes",
        "notes",
    ];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        r.only(Self::FIELDS)?;
        Ok(Self {
            id: fields::variable_id("id", r.required("id")?)?,
            category: fields::comma_split(r.required("category")?)
                .iter()
                .map(|c| fields::capitalize(c))
                .collect(),
            title: r.required("title")?.to_string(),
            definition: r.required("definition")?.to_string(),
            var_type: r.required("type")?.parse()?,
            units: r.optional("units").to_string(),
            source: r.required("source")?.to_string(),
            changes: r.required("changes")?.to_string(),
            notes: r.required("notes")?.to_string(),
            codes: Vec::new(),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            fields::comma_join(&self.category),
            self.title.clone(),
            self.definition.clone(),
            self.var_type.to_string(),
            self.units.clone(),
            self.source.clone(),
            self.changes.clone(),
            self.notes.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::row;

    fn variable_row(var_type: &str) -> Row {
        row([
            ("id", "EA001"),
            ("category", "economy, SUBSISTENCE"),
            ("title", "Gathering"),
            ("definition", "Dependence on gathering"),
            ("type", var_type),
            ("units", ""),
            ("source", "Murdock"),
            ("changes", ""),
            ("notes", ""),
        ])
    }

    #[test]
    fn categories_are_capitalized() {
        let variable = Variable::from_row(&variable_row("Ordinal")).unwrap();
        assert_eq!(variable.category, vec!["Economy", "Subsistence"]);
        assert_eq!(variable.var_type, VariableType::Ordinal);
        assert!(variable.var_type.has_codes());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Variable::from_row(&variable_row("Nominal")).unwrap_err();
        assert!(matches!(err, ValidationError::Choice { field: "type", .. }));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let mut fields = variable_row("Continuous");
        fields.insert("extra".to_string(), "x".to_string());
        assert!(matches!(
            Variable::from_row(&fields),
            Err(ValidationError::UnexpectedField { .. })
        ));
    }

    #[test]
    fn code_id_joins_variable_and_code() {
        let code = Code::from_row(&row([
            ("var_id", "EA001"),
            ("code", "3"),
            ("description", ""),
            ("name", "Three"),
        ]))
        .unwrap();
        assert_eq!(code.id(), "EA001-3");
        assert!(!code.is_na());
    }
}
