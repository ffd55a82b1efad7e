//! Edit command handlers.
//!
//! An edit batch describes the changes made in an interactive table: edited cells by row index,
//! appended rows and deleted row indices. The batch is applied to the current collection and the
//! result replaces the data file.

use crate::args::EditBatchArgs;
use crate::commands::{open_state, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Record;
use crate::reconcile::{EditBatch, Reconciled};
use crate::utils;
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// What an edit batch did.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct EditOutcome {
    pub edited: usize,
    pub added: usize,
    pub deleted: usize,
    /// Rows removed because their date or amount was empty or invalid after the edits.
    pub dropped: usize,
    /// The number of rows saved.
    pub rows: usize,
}

impl<R: Record> From<&Reconciled<R>> for EditOutcome {
    fn from(r: &Reconciled<R>) -> Self {
        Self {
            edited: r.edited,
            added: r.added,
            deleted: r.deleted,
            dropped: r.dropped,
            rows: r.records.len(),
        }
    }
}

/// Reads an edit batch from the file named in `args`, or from stdin.
///
/// # Errors
/// - `Io` if the input cannot be read.
/// - `Parse` if the input is not an edit batch.
pub async fn read_batch(args: &EditBatchArgs) -> Result<EditBatch> {
    let json = match args.batch() {
        Some(path) => utils::read(path).await.pub_result(ErrorType::Io)?,
        None => {
            let mut json = String::new();
            tokio::io::stdin()
                .read_to_string(&mut json)
                .await
                .context("Unable to read the edit batch from stdin")
                .pub_result(ErrorType::Io)?;
            json
        }
    };
    serde_json::from_str(&json)
        .context("Unable to parse the edit batch")
        .pub_result(ErrorType::Parse)
}

/// Applies `batch` to the transactions and saves them. An empty batch leaves the file alone.
///
/// # Errors
/// - `Io` if the transactions file cannot be written, or exists but could not be read.
pub async fn edit_transactions(config: Config, batch: EditBatch) -> Result<Out<EditOutcome>> {
    let mut state = open_state(&config).await;
    if batch.is_empty() {
        return Ok(unchanged("transactions", state.transactions().len()));
    }
    let reconciled = state.apply_transaction_edits(&batch).await?;
    Ok(outcome("transactions", EditOutcome::from(&reconciled)))
}

/// Applies `batch` to the bills and saves them. An empty batch leaves the file alone.
///
/// # Errors
/// - `Io` if the bills file cannot be written, or exists but could not be read.
pub async fn edit_bills(config: Config, batch: EditBatch) -> Result<Out<EditOutcome>> {
    let mut state = open_state(&config).await;
    if batch.is_empty() {
        return Ok(unchanged("bills", state.bills().len()));
    }
    let reconciled = state.apply_bill_edits(&batch).await?;
    Ok(outcome("bills", EditOutcome::from(&reconciled)))
}

fn outcome(name: &str, o: EditOutcome) -> Out<EditOutcome> {
    let mut message = format!(
        "Saved {} {name}: {} edited, {} added, {} deleted",
        o.rows, o.edited, o.added, o.deleted
    );
    if o.dropped > 0 {
        message.push_str(&format!(
            ". {} dropped for an empty or invalid date or amount",
            utils::plural(o.dropped, "row was", "rows were")
        ));
    }
    Out::new(message, o)
}

fn unchanged(name: &str, rows: usize) -> Out<EditOutcome> {
    let o = EditOutcome {
        edited: 0,
        added: 0,
        deleted: 0,
        dropped: 0,
        rows,
    };
    Out::new(format!("Nothing to apply, {name} unchanged"), o)
}
