use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fields::{self, Row, RowReader};
use crate::record::Record;
use crate::reference::Reference;
use crate::variable::NA;

/// One coded observation: the value of a variable for a society.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub soc_id: String,
    pub sub_case: String,
    pub year: String,
    pub var_id: String,
    pub code: String,
    pub comment: String,
    pub references: Vec<Reference>,
    pub source_coded_data: String,
    pub admin_comment: String,
    /// The `references` cell as read; written back while it still parses to
    /// `references`.
    #[serde(skip)]
    references_text: String,
}

impl Data {
    pub fn is_missing(&self) -> bool {
        self.code == NA
    }

    fn parse_references(text: &str) -> Vec<Reference> {
        fields::semicolon_split(text)
            .iter()
            .map(|s| Reference::from_string(s))
            .collect()
    }

    fn references_cell(&self) -> String {
        if Self::parse_references(&self.references_text) == self.references {
            return self.references_text.clone();
        }
        let references: Vec<String> = self.references.iter().map(ToString::to_string).collect();
        fields::semicolon_join(&references)
    }
}

impl Record for Data {
    const NAME: &'static str = "Data";
    const FIELDS: &'static [&'static str] = &[
        "soc_id",
        "sub_case",
        "year",
        "var_id",
        "code",
        "comment",
        "references",
        "source_coded_data",
        "admin_comment",
    ];

    fn from_row(row: &Row) -> Result<Self> {
        let r = RowReader::new(Self::NAME, row);
        r.only(Self::FIELDS)?;
        let references_text = r.required("references")?;
        Ok(Self {
            soc_id: r.required("soc_id")?.to_string(),
            sub_case: r.required("sub_case")?.to_string(),
            year: r.required("year")?.to_string(),
            var_id: r.required("var_id")?.to_string(),
            code: r.required("code")?.to_string(),
            comment: r.required("comment")?.to_string(),
            references: Self::parse_references(references_text),
            source_coded_data: r.required("source_coded_data")?.to_string(),
            admin_comment: r.required("admin_comment")?.to_string(),
            references_text: references_text.to_string(),
        })
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.soc_id.clone(),
            self.sub_case.clone(),
            self.year.clone(),
            self.var_id.clone(),
            self.code.clone(),
            self.comment.clone(),
            self.references_cell(),
            self.source_coded_data.clone(),
            self.admin_comment.clone(),
        ]
    }
}
