//! The state of one session: the current transactions and bills and the store that persists
//! them.
//!
//! Every change goes through `AppState`, which saves the new collection first and only then
//! replaces the collection it holds. A failed save leaves the in-memory collection as it was.

use crate::error::{Error, ErrorType, Result};
use crate::model::{
    normalize_new_category, Amount, Bill, Coercion, Record, Transaction, TransactionKind,
};
use crate::reconcile::{reconcile, EditBatch, Reconciled};
use crate::report::{self, Overview};
use crate::store::Store;
use crate::Config;
use anyhow::anyhow;
use chrono::{Days, Local, NaiveDate};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The number of days after today a new bill is due when no due date is given.
pub const DEFAULT_BILL_TERM_DAYS: u64 = 30;

/// A transaction entered through the add form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Amount,
    pub description: String,
}

/// A bill entered through the add form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub description: String,
    pub amount: Amount,
    /// Defaults to `DEFAULT_BILL_TERM_DAYS` from today.
    pub due_date: Option<NaiveDate>,
}

/// One data file and the collection loaded from it.
#[derive(Debug)]
struct Collection<R: Record> {
    path: PathBuf,
    records: Vec<R>,
    dropped: usize,
    problem: Option<Error>,
}

impl<R: Record> Collection<R> {
    async fn open(store: &mut Store, path: PathBuf) -> Self {
        let mut collection = Self {
            path,
            records: Vec::new(),
            dropped: 0,
            problem: None,
        };
        collection.load(store).await;
        collection
    }

    async fn load(&mut self, store: &mut Store) {
        let loaded = store.load::<R>(&self.path).await;
        self.records = loaded.records;
        self.dropped = loaded.dropped;
        self.problem = loaded.problem;
    }

    async fn save(&mut self, store: &mut Store, records: Vec<R>) -> Result<()> {
        if let Some(problem) = &self.problem {
            return Err(Error::new(
                ErrorType::Io,
                anyhow!(
                    "Refusing to overwrite {} at {} because it could not be loaded: {problem}",
                    R::NAME,
                    self.path.display()
                ),
            ));
        }
        store.save(&self.path, &records).await?;
        self.records = records;
        self.dropped = 0;
        Ok(())
    }
}

/// The current collections of a session.
#[derive(Debug)]
pub struct AppState {
    store: Store,
    coercion: Coercion,
    transactions: Collection<Transaction>,
    bills: Collection<Bill>,
}

impl AppState {
    /// Loads both data files named by `config`. Loading never fails; see `load_problems`.
    pub async fn open(config: &Config) -> Self {
        let mut store = Store::new();
        let transactions: Collection<Transaction> =
            Collection::open(&mut store, config.transactions_path()).await;
        let bills: Collection<Bill> = Collection::open(&mut store, config.bills_path()).await;
        debug!(
            "Opened {} transactions and {} bills",
            transactions.records.len(),
            bills.records.len()
        );
        Self {
            store,
            coercion: config.edit_coercion(),
            transactions,
            bills,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions.records
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills.records
    }

    pub fn transactions_path(&self) -> &Path {
        &self.transactions.path
    }

    pub fn bills_path(&self) -> &Path {
        &self.bills.path
    }

    /// The errors from data files that exist but could not be read. Such a file is treated as
    /// empty and will not be overwritten.
    pub fn load_problems(&self) -> Vec<&Error> {
        [&self.transactions.problem, &self.bills.problem]
            .into_iter()
            .flatten()
            .collect()
    }

    /// The number of transaction and bill rows dropped by the last load.
    pub fn dropped(&self) -> (usize, usize) {
        (self.transactions.dropped, self.bills.dropped)
    }

    /// Reads the transactions again, from the cache unless they were saved since.
    pub async fn load_transactions(&mut self) -> &[Transaction] {
        self.transactions.load(&mut self.store).await;
        &self.transactions.records
    }

    /// Reads the bills again, from the cache unless they were saved since.
    pub async fn load_bills(&mut self) -> &[Bill] {
        self.bills.load(&mut self.store).await;
        &self.bills.records
    }

    /// Saves `transactions` as the complete collection.
    pub async fn save_transactions(&mut self, transactions: Vec<Transaction>) -> Result<()> {
        self.transactions.save(&mut self.store, transactions).await
    }

    /// Saves `bills` as the complete collection.
    pub async fn save_bills(&mut self, bills: Vec<Bill>) -> Result<()> {
        self.bills.save(&mut self.store, bills).await
    }

    /// Applies a batch of table edits to the transactions and saves the result.
    pub async fn apply_transaction_edits(
        &mut self,
        batch: &EditBatch,
    ) -> Result<Reconciled<Transaction>> {
        let out = reconcile(&self.transactions.records, batch, &self.coercion);
        self.save_transactions(out.records.clone()).await?;
        Ok(out)
    }

    /// Applies a batch of table edits to the bills and saves the result.
    pub async fn apply_bill_edits(&mut self, batch: &EditBatch) -> Result<Reconciled<Bill>> {
        let out = reconcile(&self.bills.records, batch, &self.coercion);
        self.save_bills(out.records.clone()).await?;
        Ok(out)
    }

    /// Validates and appends a transaction.
    ///
    /// # Errors
    /// - `Validation` if the amount is below 0.01, the category is blank or the kind is not one
    ///   of the kinds offered by the form.
    /// - `Io` if the transactions file cannot be written.
    pub async fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        check_amount(new.amount)?;
        let category = normalize_new_category(&new.category)
            .ok_or_else(|| Error::validation("Enter a category for the transaction"))?;
        if !TransactionKind::choices().contains(&new.kind) {
            return Err(Error::validation(format!(
                "'{}' is not a transaction kind, use one of {}",
                new.kind,
                TransactionKind::choices().map(|k| k.to_string()).join(", ")
            )));
        }
        let txn = Transaction::new(new.date, new.kind, category, new.amount, new.description);

        let mut next = self.transactions.records.clone();
        next.push(txn.clone());
        self.save_transactions(next).await?;
        debug!("Added a transaction of {} on {}", txn.amount(), txn.date());
        Ok(txn)
    }

    /// Validates and appends an unpaid bill.
    ///
    /// # Errors
    /// - `Validation` if the amount is below 0.01.
    /// - `Io` if the bills file cannot be written.
    pub async fn add_bill(&mut self, new: NewBill) -> Result<Bill> {
        check_amount(new.amount)?;
        let due_date = match new.due_date {
            Some(d) => d,
            None => default_due_date(Local::now().date_naive())?,
        };
        if new.description.trim().is_empty() {
            warn!("Adding a bill without a description");
        }
        let bill = Bill::new(new.description, new.amount, due_date);

        let mut next = self.bills.records.clone();
        next.push(bill.clone());
        self.save_bills(next).await?;
        debug!("Added a bill of {} due {}", bill.amount(), bill.due_date());
        Ok(bill)
    }

    /// The money set aside in the travel reserve.
    pub fn travel_reserve(&self) -> Decimal {
        report::total_by_kind(self.transactions(), &TransactionKind::TravelReserve)
    }

    pub fn overview(&self) -> Overview {
        report::overview(self.transactions(), self.bills())
    }
}

/// The due date of a new bill added on `today` without one.
pub fn default_due_date(today: NaiveDate) -> Result<NaiveDate> {
    today
        .checked_add_days(Days::new(DEFAULT_BILL_TERM_DAYS))
        .ok_or_else(|| Error::new(ErrorType::Internal, anyhow!("The date {today} is too late")))
}

fn check_amount(amount: Amount) -> Result<()> {
    if amount.value() < Decimal::new(1, 2) {
        return Err(Error::validation(format!(
            "The amount must be at least 0.01, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RowEdit;
    use crate::test::TestEnv;
    use crate::utils;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_txn(category: &str, amount: &str) -> NewTransaction {
        NewTransaction {
            date: date(2025, 5, 1),
            kind: TransactionKind::Expense,
            category: category.to_string(),
            amount: Amount::from_str(amount).unwrap(),
            description: "padaria".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_empty_home() {
        let env = TestEnv::new().await;
        let state = AppState::open(env.config()).await;
        assert!(state.transactions().is_empty());
        assert!(state.bills().is_empty());
        assert!(state.load_problems().is_empty());
    }

    #[tokio::test]
    async fn test_add_transaction_persists() {
        let env = TestEnv::new().await;
        let mut state = AppState::open(env.config()).await;
        let txn = state
            .add_transaction(new_txn("  Padaria ", "12.5"))
            .await
            .unwrap();
        assert_eq!(txn.category(), "Padaria");
        assert_eq!(state.transactions().len(), 1);

        let reopened = AppState::open(env.config()).await;
        assert_eq!(reopened.transactions(), &[txn]);
    }

    #[tokio::test]
    async fn test_add_transaction_validation_leaves_state() {
        let env = TestEnv::new().await;
        let mut state = AppState::open(env.config()).await;

        let err = state.add_transaction(new_txn("   ", "10")).await.unwrap_err();
        assert!(err.is_validation());
        let err = state
            .add_transaction(new_txn("Outros", "0.001"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        let mut unset = new_txn("Outros", "1");
        unset.kind = TransactionKind::Unset;
        assert!(state.add_transaction(unset).await.unwrap_err().is_validation());

        assert!(state.transactions().is_empty());
        assert!(!state.transactions_path().exists());
    }

    #[tokio::test]
    async fn test_add_bill_default_due_date() {
        let env = TestEnv::new().await;
        let mut state = AppState::open(env.config()).await;
        let bill = state
            .add_bill(NewBill {
                description: "Internet".to_string(),
                amount: Amount::from_str("99.90").unwrap(),
                due_date: None,
            })
            .await
            .unwrap();
        let expected = default_due_date(Local::now().date_naive()).unwrap();
        // allow for midnight passing during the test
        assert!(bill.due_date() >= expected - Days::new(1) && bill.due_date() <= expected);
        assert!(!bill.paid());
        assert_eq!(state.load_bills().await.len(), 1);
    }

    #[tokio::test]
    async fn test_edits_then_reload() {
        let env = TestEnv::new().await;
        let mut state = AppState::open(env.config()).await;
        state.add_transaction(new_txn("Outros", "10")).await.unwrap();
        state.add_transaction(new_txn("Aluguel", "20")).await.unwrap();

        let mut cells = RowEdit::new();
        cells.insert("Valor".to_string(), "abc".into());
        let batch = EditBatch {
            edited_rows: BTreeMap::from([(0, cells)]),
            ..EditBatch::default()
        };
        let out = state.apply_transaction_edits(&batch).await.unwrap();
        assert_eq!(out.dropped, 1);
        assert_eq!(state.transactions().len(), 1);
        assert_eq!(state.load_transactions().await.len(), 1);
        assert_eq!(state.transactions()[0].category(), "Aluguel");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_mirror() {
        let env = TestEnv::new().await;
        let mut state = AppState::open(env.config()).await;
        state.add_transaction(new_txn("Outros", "10")).await.unwrap();

        // a directory where the file should be makes the rename fail
        let path = state.transactions_path().to_path_buf();
        tokio::fs::remove_file(&path).await.unwrap();
        utils::make_dir(&path).await.unwrap();

        let result = state.add_transaction(new_txn("Outros", "5")).await;
        assert_eq!(result.unwrap_err().error_type(), ErrorType::Io);
        assert_eq!(state.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_not_overwritten() {
        let env = TestEnv::new().await;
        utils::write(env.config().bills_path(), "Descrição\nLuz\n")
            .await
            .unwrap();
        let mut state = AppState::open(env.config()).await;
        assert_eq!(state.load_problems().len(), 1);
        assert!(state.bills().is_empty());

        let result = state.save_bills(Vec::new()).await;
        assert_eq!(result.unwrap_err().error_type(), ErrorType::Io);
        let text = utils::read(env.config().bills_path().as_path()).await.unwrap();
        assert_eq!(text, "Descrição\nLuz\n");
    }

    #[tokio::test]
    async fn test_travel_reserve_and_overview() {
        let env = TestEnv::new().await;
        let mut state = AppState::open(env.config()).await;
        let mut reserve = new_txn("Viagem", "250");
        reserve.kind = TransactionKind::TravelReserve;
        state.add_transaction(reserve).await.unwrap();
        let mut income = new_txn("Salário", "1000");
        income.kind = TransactionKind::Income;
        state.add_transaction(income).await.unwrap();

        assert_eq!(state.travel_reserve(), Decimal::from(250));
        assert_eq!(state.overview().cash_balance, Decimal::from(750));
    }

    #[test]
    fn test_default_due_date() {
        assert_eq!(default_due_date(date(2025, 1, 15)).unwrap(), date(2025, 2, 14));
    }
}
