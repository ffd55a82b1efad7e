//! Add command handlers.

use crate::args::{AddBillArgs, AddTransactionArgs};
use crate::commands::{money, open_state, Out};
use crate::model::{Bill, Transaction, STORAGE_DATE_FORMAT};
use crate::state::{NewBill, NewTransaction};
use crate::{Config, Result};
use chrono::Local;

/// Appends a transaction to the transactions file.
///
/// The category is trimmed. It does not need to be one of the categories already in use, a new
/// one is offered by `list categories` from then on.
///
/// # Errors
/// - `Validation` if the amount is below 0.01 or the category is blank.
/// - `Io` if the transactions file cannot be written, or exists but could not be read.
pub async fn add_transaction(config: Config, args: AddTransactionArgs) -> Result<Out<Transaction>> {
    let mut state = open_state(&config).await;
    let new = NewTransaction {
        date: args.date().unwrap_or_else(|| Local::now().date_naive()),
        kind: args.kind().into(),
        category: args.category().to_string(),
        amount: args.amount(),
        description: args.description().to_string(),
    };
    let txn = state.add_transaction(new).await?;
    Ok(Out::new(
        format!(
            "Added {} '{}' of {} on {}",
            txn.kind(),
            txn.category(),
            money(&config, txn.amount()),
            txn.date().format(STORAGE_DATE_FORMAT)
        ),
        txn,
    ))
}

/// Appends an unpaid bill to the bills file. The due date defaults to 30 days from today.
///
/// # Errors
/// - `Validation` if the amount is below 0.01.
/// - `Io` if the bills file cannot be written, or exists but could not be read.
pub async fn add_bill(config: Config, args: AddBillArgs) -> Result<Out<Bill>> {
    let mut state = open_state(&config).await;
    let bill = state
        .add_bill(NewBill {
            description: args.description().to_string(),
            amount: args.amount(),
            due_date: args.due_date(),
        })
        .await?;
    Ok(Out::new(
        format!(
            "Registered the bill '{}' of {} due {}",
            bill.description(),
            money(&config, bill.amount()),
            bill.due_date().format(STORAGE_DATE_FORMAT)
        ),
        bill,
    ))
}
