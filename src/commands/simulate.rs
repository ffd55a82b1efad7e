use crate::args::SimulateArgs;
use crate::commands::Out;
use crate::model::currency;
use crate::projection::{simulate_growth, Simulation};
use crate::Result;
use rust_decimal::Decimal;

/// Projects the growth of an investment. This does not read the data files, so it works before
/// `caixa init`.
///
/// # Errors
/// - `Validation` if there is nothing to invest, an input is negative, the period is zero or
///   above 100 years, or the result is too large to compute.
pub fn simulate(args: &SimulateArgs, currency_symbol: &str) -> Result<Out<Simulation>> {
    let input = args.input();
    let sim = simulate_growth(&input)?;
    let s = &sim.summary;
    let fmt = |v: f64| match Decimal::try_from(v) {
        Ok(value) => currency(value, currency_symbol),
        // beyond the range of Decimal
        Err(_) => format!("{currency_symbol} {v:.2}"),
    };
    let message = format!(
        "After {} year(s) at {}% a year ({:.4}% a month):\n\
         Invested:      {}\n\
         Accumulated:   {}\n\
         Interest:      {}\n\
         Growth:        {:.2}%",
        input.years,
        input.annual_rate_percent,
        sim.monthly_rate * 100.0,
        fmt(s.final_invested),
        fmt(s.final_accumulated),
        fmt(s.interest_earned),
        s.growth_percent
    );
    Ok(Out::new(message, sim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_CURRENCY;

    #[test]
    fn test_simulate_message() {
        let args = SimulateArgs::new(1000.0, 0.0, 0.0, 1);
        let out = simulate(&args, DEFAULT_CURRENCY).unwrap();
        assert!(out.message().contains("Invested:      R$ 1,000.00"));
        assert!(out.message().contains("Growth:        0.00%"));
        assert_eq!(out.structure().unwrap().accumulated.len(), 12);
    }

    #[test]
    fn test_simulate_prints_values_beyond_decimal_range() {
        let args = SimulateArgs::new(1000.0, 100.0, 1.0e6, 50);
        let out = simulate(&args, DEFAULT_CURRENCY).unwrap();
        let summary = &out.structure().unwrap().summary;
        assert!(summary.final_accumulated > 1.0e100);
        assert!(!out.message().contains("Accumulated:   R$ 0.00"));
        assert!(!out.message().contains("Interest:      R$ 0.00"));
        assert!(out.message().contains("Invested:      R$ 60,900.00"));
    }

    #[test]
    fn test_simulate_rejects_overflow_and_long_periods() {
        let args = SimulateArgs::new(1000.0, 100.0, 1.0e300, 100);
        assert!(simulate(&args, DEFAULT_CURRENCY).unwrap_err().is_validation());
        let args = SimulateArgs::new(1000.0, 100.0, 10.0, u32::MAX);
        assert!(simulate(&args, DEFAULT_CURRENCY).unwrap_err().is_validation());
    }

    #[test]
    fn test_simulate_rejects_nothing_to_invest() {
        let args = SimulateArgs::new(0.0, 0.0, 10.0, 5);
        assert!(simulate(&args, DEFAULT_CURRENCY).unwrap_err().is_validation());
    }
}
