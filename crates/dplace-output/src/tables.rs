//! Typed rows of the output tables.

use dplace_model::fields::format_float;

use crate::schema::{Column, ForeignKey, Table, TableSchema, TERMS};

pub const DATASETS: &str = "datasets.csv";
pub const SOCIETIES: &str = "societies.csv";
pub const VARIABLES: &str = "variables.csv";
pub const CODES: &str = "codes.csv";
pub const DATA: &str = "data.csv";
pub const SOCIETY_RELATIONS: &str = "society_relations.csv";

/// A row type together with the description of its table.
pub trait TableRow {
    fn table() -> Table;
    /// Cell values in the column order of [`TableRow::table`]; nulls are empty.
    fn cells(&self) -> Vec<String>;
}

/// Every output table, in write order.
pub fn tables() -> Vec<Table> {
    vec![
        DatasetRow::table(),
        LanguageRow::table(),
        ParameterRow::table(),
        CodeRow::table(),
        ValueRow::table(),
        RelationRow::table(),
    ]
}

fn table(url: &str, component: Option<&str>, columns: Vec<Column>, foreign_keys: Vec<ForeignKey>) -> Table {
    Table {
        url: url.to_string(),
        conforms_to: component.map(|c| format!("{TERMS}#{c}")),
        table_schema: TableSchema {
            columns,
            primary_key: vec!["ID".to_string()],
            foreign_keys,
        },
    }
}

fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub year: String,
    pub author: String,
    pub reference: String,
    pub url: String,
}

impl TableRow for DatasetRow {
    fn table() -> Table {
        table(
            DATASETS,
            None,
            vec![
                Column::term("ID", "id"),
                Column::term("Name", "name"),
                Column::term("Description", "description"),
                Column::new("Type"),
                Column::new("Year"),
                Column::new("Author"),
                Column::new("Reference"),
                Column::new("URL"),
            ],
            Vec::new(),
        )
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.kind.clone(),
            self.year.clone(),
            self.author.clone(),
            self.reference.clone(),
            self.url.clone(),
        ]
    }
}

/// A society.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRow {
    pub id: String,
    pub name: String,
    pub glottocode: String,
    pub latitude: f64,
    pub longitude: f64,
    pub comment: String,
    pub dataset_id: String,
    pub glottocode_comment: String,
    pub xd_id: String,
    pub orig_name_and_id: String,
    pub alt_names: Vec<String>,
    pub main_focal_year: Option<String>,
    pub hraf_id: Option<String>,
    pub hraf_name: Option<String>,
    pub hraf_link: String,
    pub orig_lat: f64,
    pub orig_long: f64,
    /// Level 2 region of the focal location, when regions were supplied.
    pub region: Option<String>,
}

impl TableRow for LanguageRow {
    fn table() -> Table {
        table(
            SOCIETIES,
            Some("LanguageTable"),
            vec![
                Column::term("ID", "id"),
                Column::term("Name", "name"),
                Column::term("Glottocode", "glottocode"),
                Column::term("Latitude", "latitude").datatype("decimal"),
                Column::term("Longitude", "longitude").datatype("decimal"),
                Column::term("Comment", "comment"),
                Column::new("Dataset_ID"),
                Column::new("Glottocode_Comment"),
                Column::new("xd_id"),
                Column::new("ORIG_name_and_ID_in_this_dataset"),
                Column::new("alt_names_by_society").separator(";"),
                Column::new("main_focal_year"),
                Column::new("HRAF_ID"),
                Column::new("HRAF_Name"),
                Column::new("HRAF_Link"),
                Column::new("origLat").datatype("decimal"),
                Column::new("origLong").datatype("decimal"),
                Column::new("region"),
            ],
            vec![ForeignKey::to_id("Dataset_ID", DATASETS)],
        )
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.glottocode.clone(),
            format_float(self.latitude),
            format_float(self.longitude),
            self.comment.clone(),
            self.dataset_id.clone(),
            self.glottocode_comment.clone(),
            self.xd_id.clone(),
            self.orig_name_and_id.clone(),
            self.alt_names.join(";"),
            opt(self.main_focal_year.as_ref()),
            opt(self.hraf_id.as_ref()),
            opt(self.hraf_name.as_ref()),
            self.hraf_link.clone(),
            format_float(self.orig_lat),
            format_float(self.orig_long),
            opt(self.region.as_ref()),
        ]
    }
}

/// A variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub dataset_id: String,
    pub category: Vec<String>,
    pub var_type: String,
    pub units: String,
    pub source: String,
    pub changes: String,
    pub notes: String,
}

impl TableRow for ParameterRow {
    fn table() -> Table {
        table(
            VARIABLES,
            Some("ParameterTable"),
            vec![
                Column::term("ID", "id"),
                Column::term("Name", "name"),
                Column::term("Description", "description"),
                Column::new("Dataset_ID"),
                Column::new("Category").separator(","),
                Column::new("Type"),
                Column::new("Units"),
                Column::new("Source"),
                Column::new("Changes"),
                Column::new("Notes"),
            ],
            vec![ForeignKey::to_id("Dataset_ID", DATASETS)],
        )
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.dataset_id.clone(),
            self.category.join(","),
            self.var_type.clone(),
            self.units.clone(),
            self.source.clone(),
            self.changes.clone(),
            self.notes.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRow {
    pub id: String,
    pub parameter_id: String,
    pub name: String,
    pub description: String,
    /// Position of the code; the code itself with dots removed, if numeric.
    pub ord: Option<i64>,
}

impl TableRow for CodeRow {
    fn table() -> Table {
        table(
            CODES,
            Some("CodeTable"),
            vec![
                Column::term("ID", "id"),
                Column::term("Parameter_ID", "parameterReference"),
                Column::term("Name", "name"),
                Column::term("Description", "description"),
                Column::new("ord").datatype("integer"),
            ],
            vec![ForeignKey::to_id("Parameter_ID", VARIABLES)],
        )
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.parameter_id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.ord.map(|ord| ord.to_string()).unwrap_or_default(),
        ]
    }
}

/// A coded data point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRow {
    pub id: String,
    pub language_id: String,
    pub parameter_id: String,
    pub value: Option<String>,
    pub code_id: Option<String>,
    pub comment: String,
    /// Citations in `key[pages]` form.
    pub source: Vec<String>,
    pub sub_case: String,
    pub year: Option<String>,
    pub source_coded_data: String,
    pub admin_comment: String,
    pub dataset_id: String,
}

impl TableRow for ValueRow {
    fn table() -> Table {
        table(
            DATA,
            Some("ValueTable"),
            vec![
                Column::term("ID", "id"),
                Column::term("Language_ID", "languageReference"),
                Column::term("Parameter_ID", "parameterReference"),
                Column::term("Value", "value"),
                Column::term("Code_ID", "codeReference"),
                Column::term("Comment", "comment"),
                Column::term("Source", "source").separator(";"),
                Column::new("Sub_Case"),
                Column::new("Year"),
                Column::new("Source_Coded_Data"),
                Column::new("Admin_Comment"),
                Column::new("Dataset_ID"),
            ],
            vec![
                ForeignKey::to_id("Language_ID", SOCIETIES),
                ForeignKey::to_id("Parameter_ID", VARIABLES),
                ForeignKey::to_id("Code_ID", CODES),
                ForeignKey::to_id("Dataset_ID", DATASETS),
            ],
        )
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.language_id.clone(),
            self.parameter_id.clone(),
            opt(self.value.as_ref()),
            opt(self.code_id.as_ref()),
            self.comment.clone(),
            self.source.join(";"),
            self.sub_case.clone(),
            opt(self.year.as_ref()),
            self.source_coded_data.clone(),
            self.admin_comment.clone(),
            self.dataset_id.clone(),
        ]
    }
}

/// Link between a society and a society of possibly another dataset.
///
/// Exactly one of `related_society_id` (a society in the output) and
/// `related_society_external_id` (anything else) is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
    pub id: String,
    pub society_id: String,
    pub related_society_id: Option<String>,
    pub related_society_external_id: Option<String>,
    pub related_society_name: String,
    pub related_society_dataset: String,
}

impl TableRow for RelationRow {
    fn table() -> Table {
        table(
            SOCIETY_RELATIONS,
            None,
            vec![
                Column::term("ID", "id"),
                Column::new("Society_ID"),
                Column::new("Related_Society_ID"),
                Column::new("Related_Society_External_ID"),
                Column::new("Related_Society_Name"),
                Column::new("Related_Society_Dataset"),
            ],
            vec![
                ForeignKey::to_id("Society_ID", SOCIETIES),
                ForeignKey::to_id("Related_Society_ID", SOCIETIES),
            ],
        )
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.society_id.clone(),
            opt(self.related_society_id.as_ref()),
            opt(self.related_society_external_id.as_ref()),
            self.related_society_name.clone(),
            self.related_society_dataset.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_match_cells() {
        let value = ValueRow {
            id: "EA-1".to_string(),
            language_id: "Aa1".to_string(),
            parameter_id: "EA001".to_string(),
            value: Some("1".to_string()),
            code_id: None,
            comment: String::new(),
            source: vec!["meier2001[10-15]".to_string(), "smith1990".to_string()],
            sub_case: String::new(),
            year: Some("1950".to_string()),
            source_coded_data: String::new(),
            admin_comment: String::new(),
            dataset_id: "EA".to_string(),
        };
        assert_eq!(ValueRow::table().header().len(), value.cells().len());
        assert_eq!(value.cells()[6], "meier2001[10-15];smith1990");

        let code = CodeRow {
            id: "EA001-1".to_string(),
            parameter_id: "EA001".to_string(),
            name: "x".to_string(),
            description: String::new(),
            ord: None,
        };
        assert_eq!(CodeRow::table().header().len(), code.cells().len());
        assert_eq!(code.cells()[4], "");
    }

    #[test]
    fn every_table_has_an_id_primary_key() {
        for table in tables() {
            assert_eq!(table.table_schema.primary_key, vec!["ID"]);
            assert_eq!(table.header()[0], "ID");
        }
    }
}
