//! Derived figures for the dashboard: totals, the cash balance, time series and breakdowns.
//!
//! Everything here is a pure function of the current collections.

use crate::model::{Bill, Transaction, TransactionKind};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The sum of the amounts of the transactions of `kind`.
pub fn total_by_kind(transactions: &[Transaction], kind: &TransactionKind) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind() == kind)
        .map(|t| t.amount().value())
        .sum()
}

/// The sum of the amounts of the bills marked as paid.
pub fn total_paid_bills(bills: &[Bill]) -> Decimal {
    bills
        .iter()
        .filter(|b| b.paid())
        .map(|b| b.amount().value())
        .sum()
}

/// Income minus expenses, paid bills and money moved into the travel reserve.
pub fn cash_balance(transactions: &[Transaction], bills: &[Bill]) -> Decimal {
    total_by_kind(transactions, &TransactionKind::Income)
        - total_by_kind(transactions, &TransactionKind::Expense)
        - total_paid_bills(bills)
        - total_by_kind(transactions, &TransactionKind::TravelReserve)
}

/// Expense transactions plus paid bills.
pub fn total_expense(transactions: &[Transaction], bills: &[Bill]) -> Decimal {
    total_by_kind(transactions, &TransactionKind::Expense) + total_paid_bills(bills)
}

/// One day of the cumulative income and expense chart.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub income_cumulative: Decimal,
    pub expense_cumulative: Decimal,
}

/// One point per calendar day from `start` to `end`, inclusive, with the daily income and
/// expense and their running totals. Returns an empty series when no transaction falls in the
/// range.
pub fn cumulative_series(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<CumulativePoint> {
    if start > end {
        return Vec::new();
    }
    let mut daily: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for txn in transactions {
        if txn.date() < start || txn.date() > end {
            continue;
        }
        let day = daily.entry(txn.date()).or_default();
        match txn.kind() {
            TransactionKind::Income => day.0 += txn.amount().value(),
            TransactionKind::Expense => day.1 += txn.amount().value(),
            _ => {}
        }
    }
    if daily.is_empty() {
        return Vec::new();
    }

    let mut income_cumulative = Decimal::ZERO;
    let mut expense_cumulative = Decimal::ZERO;
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let (income, expense) = daily.get(&date).copied().unwrap_or_default();
            income_cumulative += income;
            expense_cumulative += expense;
            CumulativePoint {
                date,
                income,
                expense,
                income_cumulative,
                expense_cumulative,
            }
        })
        .collect()
}

/// The earliest and latest transaction dates, the default range of the cumulative chart.
pub fn series_range(transactions: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let first = transactions.iter().map(|t| t.date()).min()?;
    let last = transactions.iter().map(|t| t.date()).max()?;
    Some((first, last))
}

/// A calendar month, displayed as `2025-01`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The expenses of one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: Month,
    pub total: Decimal,
}

/// Expense transactions and paid bills, the latter by due date, summed per month. Only months
/// with at least one such record appear, in calendar order.
pub fn monthly_expenses(transactions: &[Transaction], bills: &[Bill]) -> Vec<MonthlyTotal> {
    let expenses = transactions
        .iter()
        .filter(|t| t.kind() == &TransactionKind::Expense)
        .map(|t| (t.date(), t.amount().value()));
    let paid = bills
        .iter()
        .filter(|b| b.paid())
        .map(|b| (b.due_date(), b.amount().value()));

    let mut months: BTreeMap<Month, Decimal> = BTreeMap::new();
    for (date, amount) in expenses.chain(paid) {
        *months.entry(Month::of(date)).or_default() += amount;
    }
    months
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// The mean of the monthly expenses.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub average: Decimal,
    /// The number of months the average is taken over.
    pub months: usize,
}

/// The average over the months in `monthly_expenses`, or `None` when there are no expenses at
/// all. `Some` with a zero average means the recorded expenses were all zero.
pub fn monthly_expense_average(
    transactions: &[Transaction],
    bills: &[Bill],
) -> Option<MonthlyAverage> {
    let months = monthly_expenses(transactions, bills);
    if months.is_empty() {
        return None;
    }
    let sum: Decimal = months.iter().map(|m| m.total).sum();
    let average = cents(sum / Decimal::from(months.len()));
    Some(MonthlyAverage {
        average,
        months: months.len(),
    })
}

/// The expenses of one category and its share of all expenses.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    /// Percentage of the expense total, rounded to two places.
    pub percent: Decimal,
}

/// Expense transactions summed per category, largest first. Categories are compared exactly, so
/// `Lazer` and `lazer` are separate entries. Categories with a zero total are left out.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryShare> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for txn in transactions
        .iter()
        .filter(|t| t.kind() == &TransactionKind::Expense)
    {
        *totals.entry(txn.category()).or_default() += txn.amount().value();
    }
    let grand_total: Decimal = totals.values().copied().sum();

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .filter(|(_, total)| !total.is_zero())
        .map(|(category, total)| CategoryShare {
            category: category.to_string(),
            total,
            percent: cents(total * Decimal::ONE_HUNDRED / grand_total),
        })
        .collect();
    shares.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    shares
}

/// The bills that are still to be paid.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct PendingBills {
    /// Sorted by due date.
    pub bills: Vec<Bill>,
    pub total: Decimal,
}

pub fn pending_bills(bills: &[Bill]) -> PendingBills {
    let mut pending: Vec<Bill> = bills.iter().filter(|b| !b.paid()).cloned().collect();
    pending.sort_by_key(|b| b.due_date());
    let total = pending.iter().map(|b| b.amount().value()).sum();
    PendingBills {
        bills: pending,
        total,
    }
}

/// The headline figures of the dashboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Overview {
    pub income: Decimal,
    pub expense: Decimal,
    pub paid_bills: Decimal,
    pub total_expense: Decimal,
    pub travel_reserve: Decimal,
    pub cash_balance: Decimal,
    pub monthly_average: Option<MonthlyAverage>,
    pub pending_bills: Decimal,
    pub transaction_count: usize,
    pub bill_count: usize,
}

pub fn overview(transactions: &[Transaction], bills: &[Bill]) -> Overview {
    Overview {
        income: total_by_kind(transactions, &TransactionKind::Income),
        expense: total_by_kind(transactions, &TransactionKind::Expense),
        paid_bills: total_paid_bills(bills),
        total_expense: total_expense(transactions, bills),
        travel_reserve: total_by_kind(transactions, &TransactionKind::TravelReserve),
        cash_balance: cash_balance(transactions, bills),
        monthly_average: monthly_expense_average(transactions, bills),
        pending_bills: pending_bills(bills).total,
        transaction_count: transactions.len(),
        bill_count: bills.len(),
    }
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
