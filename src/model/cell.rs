//! Raw cell values and the rules for coercing them into typed fields.

use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// The date format used in the data files.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// The date format the interactive tables display and send back in edits.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// A raw value as it arrives from a data file or an interactive table edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    /// The textual form of the value, or `None` for `Null`.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Cell::Number(n) => Some(Cow::Owned(n.to_string())),
            Cell::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Cell::Null => None,
        }
    }

    /// The textual form of the value, with `Null` as the empty string.
    pub fn text_or_empty(&self) -> String {
        self.text().map(|s| s.into_owned()).unwrap_or_default()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// What happens to a field when an edited value cannot be coerced to its type.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidEdit {
    /// The field becomes null. A null date or amount causes the whole row to be dropped.
    #[default]
    DropRow,
    /// The edit is ignored and the field keeps its previous value.
    KeepPrevious,
}

serde_plain::derive_display_from_serialize!(InvalidEdit);
serde_plain::derive_fromstr_from_deserialize!(InvalidEdit);

/// The coercion rules in effect for a batch of raw values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Coercion {
    date_format: String,
    on_invalid: InvalidEdit,
}

impl Default for Coercion {
    fn default() -> Self {
        Self::storage()
    }
}

impl Coercion {
    pub fn new(date_format: impl Into<String>, on_invalid: InvalidEdit) -> Self {
        Self {
            date_format: date_format.into(),
            on_invalid,
        }
    }

    /// The rules used when loading the data files.
    pub fn storage() -> Self {
        Self::new(STORAGE_DATE_FORMAT, InvalidEdit::DropRow)
    }

    /// The rules used for interactive table edits with the default display format.
    pub fn display() -> Self {
        Self::new(DISPLAY_DATE_FORMAT, InvalidEdit::DropRow)
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn on_invalid(&self) -> InvalidEdit {
        self.on_invalid
    }

    pub fn date(&self, cell: &Cell) -> Option<NaiveDate> {
        let text = cell.text()?;
        NaiveDate::parse_from_str(text.trim(), &self.date_format).ok()
    }

    pub fn amount(&self, cell: &Cell) -> Option<Amount> {
        Amount::from_str(&cell.text()?).ok()
    }

    pub fn flag(&self, cell: &Cell) -> Option<bool> {
        match cell {
            Cell::Bool(b) => Some(*b),
            Cell::Null => Some(false),
            Cell::Number(n) => Some(*n != 0.0),
            Cell::Text(s) => parse_flag(s),
        }
    }

    /// Stores `parsed` into `slot`. When `parsed` is `None` the value could not be coerced, and
    /// `slot` either becomes `None` or keeps its previous value according to `on_invalid`.
    pub fn assign<T>(&self, slot: &mut Option<T>, parsed: Option<T>, column: impl Display) {
        match parsed {
            Some(value) => *slot = Some(value),
            None => match self.on_invalid {
                InvalidEdit::DropRow => {
                    warn!("Unable to coerce the value for '{column}', the field is now empty");
                    *slot = None;
                }
                InvalidEdit::KeepPrevious => {
                    warn!("Unable to coerce the value for '{column}', keeping the previous value");
                }
            },
        }
    }
}

/// Parses the boolean spellings found in the bills file and in table edits.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "sim" | "x" => Some(true),
        "false" | "0" | "no" | "não" | "nao" | "" => Some(false),
        _ => None,
    }
}

/// Formats a boolean the way the bills file stores it.
pub fn format_flag(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}
