//! Command handlers for the caixa CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod edit;
mod init;
mod list;
mod overview;
mod simulate;

use crate::model::currency;
use crate::state::AppState;
use crate::Config;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use add::{add_bill, add_transaction};
pub use edit::{edit_bills, edit_transactions, read_batch, EditOutcome};
pub use init::init;
pub use list::{list_bills, list_categories, list_transactions};
pub use overview::{series, summary, Summary};
pub use simulate::simulate;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens the session state and reports any data file that could not be read.
async fn open_state(config: &Config) -> AppState {
    let state = AppState::open(config).await;
    for problem in state.load_problems() {
        warn!("Continuing without the data in a file that could not be read: {problem}");
    }
    state
}

/// Formats a figure with the configured currency symbol.
fn money(config: &Config, value: impl Into<Decimal>) -> String {
    currency(value.into(), config.currency_symbol())
}
