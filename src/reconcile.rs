//! Merging a batch of interactive table edits into a collection.
//!
//! An interactive table reports three kinds of change against the rows it was given: cells that
//! were edited, rows that were appended and rows that were deleted. `reconcile` applies them, in
//! that order, to produce the collection that should be saved next.

use crate::model::{column, Cell, Coercion, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// A row as a map from header text (e.g. `Valor`) to a raw value.
pub type RowEdit = BTreeMap<String, Cell>;

/// The changes made in an interactive table.
///
/// ```json
/// {
///   "edited_rows": { "0": { "Valor": "12.50" } },
///   "added_rows": [ { "Data": "01/02/2025", "Tipo": "Despesa", "Valor": 30 } ],
///   "deleted_rows": [ 2 ]
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBatch {
    /// Row index in the base collection → the cells that changed.
    #[serde(default)]
    pub edited_rows: BTreeMap<usize, RowEdit>,

    /// Rows appended to the table, in order. Missing cells take the row defaults.
    #[serde(default)]
    pub added_rows: Vec<RowEdit>,

    /// Row indices to delete. Base rows come first, then added rows.
    #[serde(default)]
    pub deleted_rows: BTreeSet<usize>,
}

impl EditBatch {
    pub fn is_empty(&self) -> bool {
        self.edited_rows.is_empty() && self.added_rows.is_empty() && self.deleted_rows.is_empty()
    }
}

/// The outcome of `reconcile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciled<R: Record> {
    pub records: Vec<R>,
    /// Number of base rows that had at least one edit applied.
    pub edited: usize,
    pub added: usize,
    pub deleted: usize,
    /// Rows removed because their date or amount was empty after the edits.
    pub dropped: usize,
}

/// Applies `batch` to `base`, coercing every raw value with `coercion`.
///
/// Edits to rows that do not exist, cells under unknown headers and deletions of rows that do
/// not exist are skipped with a warning. Nothing here fails: a row that ends up without a date
/// or an amount is dropped.
pub fn reconcile<R: Record>(base: &[R], batch: &EditBatch, coercion: &Coercion) -> Reconciled<R> {
    let mut drafts: Vec<R::Draft> = base.iter().cloned().map(R::Draft::from).collect();

    let mut edited = 0;
    for (&index, cells) in &batch.edited_rows {
        let Some(draft) = drafts.get_mut(index) else {
            warn!(
                "Ignoring an edit to {} row {index}, there are only {} rows",
                R::NAME,
                base.len()
            );
            continue;
        };
        if apply::<R>(draft, cells, coercion) > 0 {
            edited += 1;
        }
    }

    for cells in &batch.added_rows {
        let mut draft = R::blank();
        apply::<R>(&mut draft, cells, coercion);
        drafts.push(draft);
    }

    let mut deleted = 0;
    for &index in batch.deleted_rows.iter().rev() {
        if index < drafts.len() {
            drafts.remove(index);
            deleted += 1;
        } else {
            warn!("Ignoring the deletion of {} row {index}, it does not exist", R::NAME);
        }
    }

    let remaining = drafts.len();
    let records: Vec<R> = drafts.into_iter().filter_map(R::finish).collect();
    let dropped = remaining - records.len();
    if dropped > 0 {
        warn!(
            "Dropped {dropped} {} row(s) with an empty or invalid date or amount",
            R::NAME
        );
    }
    debug!(
        "Reconciled {}: {edited} edited, {} added, {deleted} deleted, {dropped} dropped",
        R::NAME,
        batch.added_rows.len()
    );

    Reconciled {
        records,
        edited,
        added: batch.added_rows.len(),
        deleted,
        dropped,
    }
}

/// Sets each cell on the draft, returning the number of cells under a known header.
fn apply<R: Record>(draft: &mut R::Draft, cells: &RowEdit, coercion: &Coercion) -> usize {
    let mut applied = 0;
    for (header, cell) in cells {
        match column::<R>(header) {
            Some(col) => {
                R::set(draft, col, cell, coercion);
                applied += 1;
            }
            None => warn!("Ignoring an edit to unknown {} column '{header}'", R::NAME),
        }
    }
    applied
}
