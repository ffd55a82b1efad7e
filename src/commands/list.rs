//! List command handlers.

use crate::args::{ListBillsArgs, ListTransactionsArgs};
use crate::commands::{money, open_state, Out};
use crate::model::{
    category_options, filter_by_category, format_flag, Bill, Transaction, DISPLAY_DATE_FORMAT,
};
use crate::report::pending_bills;
use crate::utils::plural;
use crate::{Config, Result};

/// Lists the transactions, oldest first, optionally only those in one category.
pub async fn list_transactions(
    config: Config,
    args: ListTransactionsArgs,
) -> Result<Out<Vec<Transaction>>> {
    let state = open_state(&config).await;
    let mut transactions: Vec<Transaction> = match args.category() {
        Some(category) => filter_by_category(state.transactions(), category)
            .into_iter()
            .cloned()
            .collect(),
        None => state.transactions().to_vec(),
    };
    transactions.sort_by_key(|t| t.date());

    let mut lines = vec![plural(transactions.len(), "transaction", "transactions")];
    lines.extend(transactions.iter().map(|t| {
        format!(
            "{}  {:<20} {:<16} {:>16}  {}",
            t.date().format(DISPLAY_DATE_FORMAT),
            t.kind(),
            t.category(),
            money(&config, t.amount()),
            t.description()
        )
    }));
    Ok(Out::new(lines.join("\n"), transactions))
}

/// Lists the bills by due date. With `--pending` only unpaid bills are listed, followed by their
/// total.
pub async fn list_bills(config: Config, args: ListBillsArgs) -> Result<Out<Vec<Bill>>> {
    let state = open_state(&config).await;
    let (bills, total) = if args.pending() {
        let pending = pending_bills(state.bills());
        (pending.bills, Some(pending.total))
    } else {
        let mut bills = state.bills().to_vec();
        bills.sort_by_key(|b| b.due_date());
        (bills, None)
    };

    let mut lines = vec![plural(bills.len(), "bill", "bills")];
    lines.extend(bills.iter().map(|b| {
        format!(
            "{}  {:<24} {:>16}  paid: {}",
            b.due_date().format(DISPLAY_DATE_FORMAT),
            b.description(),
            money(&config, b.amount()),
            format_flag(b.paid())
        )
    }));
    if let Some(total) = total {
        lines.push(format!("Total to pay: {}", money(&config, total)));
    }
    Ok(Out::new(lines.join("\n"), bills))
}

/// Lists the categories offered when adding a transaction: the ones already in use, then the
/// core set.
pub async fn list_categories(config: Config) -> Result<Out<Vec<String>>> {
    let state = open_state(&config).await;
    let options = category_options(state.transactions());
    let message = format!(
        "{}\n{}",
        plural(options.len(), "category", "categories"),
        options.join("\n")
    );
    Ok(Out::new(message, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_list_transactions_by_category() {
        let env = TestEnv::with_sample_data().await;
        let out = list_transactions(
            env.config().clone(),
            ListTransactionsArgs::new(Some("Alimentação".to_string())),
        )
        .await
        .unwrap();
        let txns = out.structure().unwrap();
        assert_eq!(txns.len(), 2);
        assert!(out.message().starts_with("2 transactions\n08/01/2025"));

        let out = list_transactions(
            env.config().clone(),
            ListTransactionsArgs::new(Some("alimentação".to_string())),
        )
        .await
        .unwrap();
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_bills_pending() {
        let env = TestEnv::with_sample_data().await;
        let out = list_bills(env.config().clone(), ListBillsArgs::new(true))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        assert!(out.message().ends_with("Total to pay: R$ 99.90"));

        let out = list_bills(env.config().clone(), ListBillsArgs::new(false))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_categories() {
        let env = TestEnv::with_sample_data().await;
        let out = list_categories(env.config().clone()).await.unwrap();
        let options = out.structure().unwrap();
        assert_eq!(options[0], "Lazer");
        assert_eq!(options.len(), 7);
    }
}
