//! Summary and series command handlers.

use crate::args::SeriesArgs;
use crate::commands::{money, open_state, Out};
use crate::error::Error;
use crate::model::DISPLAY_DATE_FORMAT;
use crate::report::{
    category_breakdown, cumulative_series, monthly_expenses, overview, series_range,
    CategoryShare, CumulativePoint, MonthlyTotal, Overview,
};
use crate::{Config, Result};
use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;

/// Everything the dashboard shows as figures.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub overview: Overview,
    pub monthly_expenses: Vec<MonthlyTotal>,
    pub categories: Vec<CategoryShare>,
}

/// Computes the totals, the cash balance, the monthly expenses and the expenses by category.
pub async fn summary(config: Config) -> Result<Out<Summary>> {
    let state = open_state(&config).await;
    let summary = Summary {
        overview: overview(state.transactions(), state.bills()),
        monthly_expenses: monthly_expenses(state.transactions(), state.bills()),
        categories: category_breakdown(state.transactions()),
    };

    let o = &summary.overview;
    let mut lines = vec![
        format!("Income:          {}", money(&config, o.income)),
        format!("Expenses:        {}", money(&config, o.expense)),
        format!("Paid bills:      {}", money(&config, o.paid_bills)),
        format!("Total spending:  {}", money(&config, o.total_expense)),
        format!("Travel reserve:  {}", money(&config, o.travel_reserve)),
        format!("Cash balance:    {}", money(&config, o.cash_balance)),
        format!("Pending bills:   {}", money(&config, o.pending_bills)),
    ];
    lines.push(match &o.monthly_average {
        Some(avg) => format!(
            "Monthly average: {} over {} month(s)",
            money(&config, avg.average),
            avg.months
        ),
        None => "Monthly average: no expenses recorded yet".to_string(),
    });
    if !summary.monthly_expenses.is_empty() {
        lines.push("Expenses by month:".to_string());
        lines.extend(
            summary
                .monthly_expenses
                .iter()
                .map(|month| format!("  {}  {:>16}", month.month, money(&config, month.total))),
        );
    }
    if !summary.categories.is_empty() {
        lines.push("Expenses by category:".to_string());
        lines.extend(summary.categories.iter().map(|share| {
            format!(
                "  {:<20} {:>16}  {:>6}%",
                share.category,
                money(&config, share.total),
                share.percent
            )
        }));
    }
    Ok(Out::new(lines.join("\n"), summary))
}

/// Computes the cumulative income and expense series. The range defaults to the dates of the
/// first and last transactions, or to the last year when there are none.
///
/// # Errors
/// - `Validation` if `from` is after `to`.
pub async fn series(config: Config, args: SeriesArgs) -> Result<Out<Vec<CumulativePoint>>> {
    let state = open_state(&config).await;
    let (default_from, default_to) =
        series_range(state.transactions()).unwrap_or_else(|| empty_range(Local::now().date_naive()));
    let from = args.from().unwrap_or(default_from);
    let to = args.to().unwrap_or(default_to);
    if from > to {
        return Err(Error::validation(format!(
            "The start date {from} is after the end date {to}"
        )));
    }

    let points = cumulative_series(state.transactions(), from, to);
    let range = format!(
        "{} to {}",
        from.format(DISPLAY_DATE_FORMAT),
        to.format(DISPLAY_DATE_FORMAT)
    );
    let Some(last) = points.last() else {
        return Ok(Out::new(
            format!("No transactions from {range}, nothing to chart"),
            points,
        ));
    };
    let message = format!(
        "{} days from {range}: income {}, expenses {}",
        points.len(),
        money(&config, last.income_cumulative),
        money(&config, last.expense_cumulative)
    );
    Ok(Out::new(message, points))
}

/// A year back from the first day of this month, until today.
fn empty_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let from = first.checked_sub_days(Days::new(365)).unwrap_or(first);
    (from, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_summary() {
        let env = TestEnv::with_sample_data().await;
        let out = summary(env.config().clone()).await.unwrap();
        let s = out.structure().unwrap();
        // 4000 - 680.40 - 1500 - 500
        assert_eq!(s.overview.cash_balance, Decimal::new(131960, 2));
        assert_eq!(s.monthly_expenses.len(), 2);
        assert_eq!(s.categories[0].category, "Alimentação");
        assert!(out.message().contains("Cash balance:    R$ 1,319.60"));
        assert!(out
            .message()
            .contains("Pending bills:   R$ 99.90\nMonthly average: "));
        assert!(out.message().contains("Expenses by category:\n  Alimentação"));
        assert!(!out.message().ends_with('\n'));
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let env = TestEnv::new().await;
        let out = summary(env.config().clone()).await.unwrap();
        assert!(out.structure().unwrap().overview.monthly_average.is_none());
        assert!(out.message().contains("no expenses recorded yet"));
    }

    #[tokio::test]
    async fn test_series_defaults_to_data_range() {
        let env = TestEnv::with_sample_data().await;
        let out = series(env.config().clone(), SeriesArgs::default())
            .await
            .unwrap();
        let points = out.structure().unwrap();
        assert_eq!(points.first().unwrap().date, date(2025, 1, 5));
        assert_eq!(points.last().unwrap().date, date(2025, 2, 3));
        assert_eq!(points.len(), 30);
    }

    #[tokio::test]
    async fn test_series_empty_range_and_reversed() {
        let env = TestEnv::with_sample_data().await;
        let args = SeriesArgs::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let out = series(env.config().clone(), args).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert!(out.message().starts_with("No transactions"));

        let args = SeriesArgs::new(Some(date(2025, 2, 1)), Some(date(2025, 1, 1)));
        let err = series(env.config().clone(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(
            empty_range(date(2025, 3, 18)),
            (date(2024, 3, 1), date(2025, 3, 18))
        );
    }
}
