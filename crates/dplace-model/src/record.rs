use crate::error::Result;
use crate::fields::Row;

/// A record stored as one row of a CSV file with a fixed column layout.
pub trait Record: Sized {
    /// Record name used in error messages.
    const NAME: &'static str;

    /// Column order used when the record is written.
    const FIELDS: &'static [&'static str];

    /// Build the record from a header-keyed row, applying field converters.
    fn from_row(row: &Row) -> Result<Self>;

    /// Serialize in `FIELDS` order; the inverse of `from_row`.
    fn to_row(&self) -> Vec<String>;
}

/// Build a [`Row`] from `(column, value)` pairs.
pub fn row<K, V, I>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
