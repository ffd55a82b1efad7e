use crate::model::{Cell, Coercion};
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// A row type stored in one of the data files, e.g. `Transaction` or `Bill`.
///
/// Rows are built through a `Draft`, where the fields that can fail coercion are optional. A
/// draft only becomes a record in `finish`, which refuses drafts missing a required field. This
/// is how rows with an unparseable date or amount get dropped, both when loading a file and when
/// reconciling table edits.
pub trait Record: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static {
    /// The known columns of the file. `Display` and `FromStr` convert to and from header text.
    type Column: Copy + Debug + Eq + Display + FromStr + Send + Sync + 'static;

    /// An in-progress row.
    type Draft: Default + Clone + Debug + From<Self>;

    /// A name for the collection, used in messages, e.g. `transactions`.
    const NAME: &'static str;

    /// The columns in file order.
    const COLUMNS: &'static [Self::Column];

    /// A draft holding the defaults for a row added through an interactive table.
    fn blank() -> Self::Draft;

    /// Coerce `cell` and store it in the field for `column`.
    fn set(draft: &mut Self::Draft, column: Self::Column, cell: &Cell, coercion: &Coercion);

    /// Returns the record, or `None` if a required field is missing.
    fn finish(draft: Self::Draft) -> Option<Self>;

    /// The value of `column` as it is written to the data file.
    fn get(&self, column: Self::Column) -> String;

    /// The header row of the data file.
    fn headers() -> Vec<String> {
        Self::COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    /// The values in file order.
    fn to_row(&self) -> Vec<String> {
        Self::COLUMNS.iter().map(|c| self.get(*c)).collect()
    }
}

/// Looks up the column for a header, e.g. `"Valor"`.
pub fn column<R: Record>(header: &str) -> Option<R::Column> {
    R::Column::from_str(header.trim()).ok()
}
