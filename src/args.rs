//! These structs provide the CLI interface for the caixa CLI.

use crate::model::{Amount, TransactionKind};
use crate::projection::SimulationInput;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// caixa: A personal finance dashboard for the command line.
///
/// Keeps your transactions and bills in two CSV files and computes the figures a finance
/// dashboard shows: totals, the cash balance, monthly averages, a cumulative income and expense
/// series, an expense breakdown by category and a compound interest projection.
///
/// Run `caixa init` first to create the home directory.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory, the data directory and the configuration file.
    ///
    /// By default the home directory is $HOME/caixa. Pass --caixa-home or set CAIXA_HOME to put
    /// it somewhere else. The data files are created the first time something is saved.
    Init,
    /// Add a transaction or a bill.
    Add(AddArgs),
    /// Apply a batch of table edits to the transactions or the bills.
    ///
    /// The batch is JSON with the keys `edited_rows`, `added_rows` and `deleted_rows`, the shape
    /// an interactive table widget reports its changes in. Cells are keyed by column header,
    /// e.g. `Valor` or `Data de Vencimento`, and edited dates use the `edit_date_format` from
    /// the configuration (dd/mm/yyyy by default).
    Edit(EditArgs),
    /// List transactions, bills or categories.
    List(ListArgs),
    /// Show the totals, cash balance, monthly expenses and expenses by category.
    Summary,
    /// Show the cumulative income and expense series, one point per day.
    Series(SeriesArgs),
    /// Project the compound growth of an investment with monthly contributions.
    Simulate(SimulateArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where caixa data and configuration is held. Defaults to ~/caixa
    #[arg(long, env = "CAIXA_HOME", default_value_t = default_caixa_home())]
    caixa_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, caixa_home: PathBuf) -> Self {
        Self {
            log_level,
            caixa_home: caixa_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn caixa_home(&self) -> &DisplayPath {
        &self.caixa_home
    }
}

/// Args for the `caixa add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entity: AddSubcommand,
}

impl AddArgs {
    pub fn entity(&self) -> &AddSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Add an income, expense or travel reserve transaction.
    Transaction(AddTransactionArgs),
    /// Add an unpaid bill.
    Bill(AddBillArgs),
}

/// The kinds of transaction the add form offers.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum KindArg {
    Income,
    #[default]
    Expense,
    TravelReserve,
}

serde_plain::derive_display_from_serialize!(KindArg);
serde_plain::derive_fromstr_from_deserialize!(KindArg);

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
            KindArg::TravelReserve => TransactionKind::TravelReserve,
        }
    }
}

/// Args for the `caixa add transaction` command.
#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    /// The date of the transaction as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The kind of transaction.
    #[arg(long, value_enum, default_value_t = KindArg::Expense)]
    kind: KindArg,

    /// The category, e.g. Alimentação. Any text is accepted; run `caixa list categories` to see
    /// the ones already in use.
    #[arg(long)]
    category: String,

    /// The amount, at least 0.01. A currency symbol and thousands separators are accepted.
    #[arg(long)]
    amount: Amount,

    /// A free text description.
    #[arg(long, default_value = "")]
    description: String,
}

impl AddTransactionArgs {
    pub fn new(
        date: Option<NaiveDate>,
        kind: KindArg,
        category: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind,
            category: category.into(),
            amount,
            description: description.into(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn kind(&self) -> KindArg {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Args for the `caixa add bill` command.
#[derive(Debug, Parser, Clone)]
pub struct AddBillArgs {
    /// What the bill is for.
    #[arg(long)]
    description: String,

    /// The amount due, at least 0.01.
    #[arg(long)]
    amount: Amount,

    /// The due date as YYYY-MM-DD. Defaults to 30 days from today.
    #[arg(long)]
    due_date: Option<NaiveDate>,
}

impl AddBillArgs {
    pub fn new(description: impl Into<String>, amount: Amount, due_date: Option<NaiveDate>) -> Self {
        Self {
            description: description.into(),
            amount,
            due_date,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

/// Args for the `caixa edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    #[command(subcommand)]
    entity: EditSubcommand,
}

impl EditArgs {
    pub fn entity(&self) -> &EditSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum EditSubcommand {
    /// Apply table edits to the transactions.
    Transactions(EditBatchArgs),
    /// Apply table edits to the bills.
    Bills(EditBatchArgs),
}

/// Where to read an edit batch from.
#[derive(Debug, Parser, Clone)]
pub struct EditBatchArgs {
    /// The JSON file holding the edit batch. Read from stdin when absent.
    #[arg(long)]
    batch: Option<PathBuf>,
}

impl EditBatchArgs {
    pub fn new(batch: Option<PathBuf>) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> Option<&Path> {
        self.batch.as_deref()
    }
}

/// Args for the `caixa list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// List the transactions, oldest first.
    Transactions(ListTransactionsArgs),
    /// List the bills by due date.
    Bills(ListBillsArgs),
    /// List the categories offered when adding a transaction.
    Categories,
}

/// Args for the `caixa list transactions` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListTransactionsArgs {
    /// Only show transactions in exactly this category (case-sensitive).
    #[arg(long)]
    category: Option<String>,
}

impl ListTransactionsArgs {
    pub fn new(category: Option<String>) -> Self {
        Self { category }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Args for the `caixa list bills` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListBillsArgs {
    /// Only show bills that have not been paid.
    #[arg(long)]
    pending: bool,
}

impl ListBillsArgs {
    pub fn new(pending: bool) -> Self {
        Self { pending }
    }

    pub fn pending(&self) -> bool {
        self.pending
    }
}

/// Args for the `caixa series` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SeriesArgs {
    /// The first day as YYYY-MM-DD. Defaults to the earliest transaction.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The last day as YYYY-MM-DD. Defaults to the latest transaction.
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl SeriesArgs {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }
}

/// Args for the `caixa simulate` command.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// The capital invested at the start.
    #[arg(long, default_value_t = 1000.0)]
    initial: f64,

    /// The amount added every month after the first.
    #[arg(long, default_value_t = 100.0)]
    contribution: f64,

    /// The annual rate of return in percent.
    #[arg(long, default_value_t = 10.0)]
    rate: f64,

    /// The number of years to simulate.
    #[arg(long, default_value_t = 5)]
    years: u32,
}

impl SimulateArgs {
    pub fn new(initial: f64, contribution: f64, rate: f64, years: u32) -> Self {
        Self {
            initial,
            contribution,
            rate,
            years,
        }
    }

    pub fn input(&self) -> SimulationInput {
        SimulationInput {
            initial: self.initial,
            contribution: self.contribution,
            annual_rate_percent: self.rate,
            years: self.years,
        }
    }
}

fn default_caixa_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("caixa"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --caixa-home or CAIXA_HOME instead of relying on the default \
                caixa home directory.",
            );
            PathBuf::from("caixa")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_transaction() {
        let args = Args::try_parse_from([
            "caixa",
            "--caixa-home",
            "/tmp/caixa",
            "add",
            "transaction",
            "--kind",
            "travel-reserve",
            "--category",
            "Viagem",
            "--amount",
            "R$ 1,200.00",
        ])
        .unwrap();
        assert_eq!(args.common().caixa_home().path(), Path::new("/tmp/caixa"));
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        let AddSubcommand::Transaction(txn) = add.entity() else {
            panic!("expected a transaction");
        };
        assert_eq!(txn.kind(), KindArg::TravelReserve);
        assert_eq!(txn.amount().to_string(), "1200.00");
        assert!(txn.date().is_none());
        assert_eq!(
            TransactionKind::from(txn.kind()),
            TransactionKind::TravelReserve
        );
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let result = Args::try_parse_from([
            "caixa", "add", "bill", "--description", "Luz", "--amount", "-10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_simulate_defaults() {
        let args = Args::try_parse_from(["caixa", "simulate"]).unwrap();
        let Command::Simulate(sim) = args.command() else {
            panic!("expected simulate");
        };
        assert_eq!(sim.input(), SimulationInput::default());
    }

    #[test]
    fn test_log_level() {
        let args = Args::try_parse_from(["caixa", "--log-level", "debug", "summary"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
