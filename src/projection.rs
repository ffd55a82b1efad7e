//! Compound growth of an investment with a monthly contribution.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The longest period that can be simulated.
pub const MAX_YEARS: u32 = 100;

/// The parameters of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Capital invested at the start.
    pub initial: f64,
    /// Added at the start of every month after the first.
    pub contribution: f64,
    /// Annual rate of return, e.g. `10.0` for 10% a year.
    pub annual_rate_percent: f64,
    pub years: u32,
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self {
            initial: 1000.0,
            contribution: 100.0,
            annual_rate_percent: 10.0,
            years: 5,
        }
    }
}

/// The month by month outcome of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// The monthly rate equivalent to the annual rate.
    pub monthly_rate: f64,
    /// Capital put in so far, one entry per month.
    pub invested: Vec<f64>,
    /// Capital including returns, one entry per month.
    pub accumulated: Vec<f64>,
    pub summary: ProjectionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSummary {
    pub final_invested: f64,
    pub final_accumulated: f64,
    pub interest_earned: f64,
    pub growth_percent: f64,
}

/// `(1 + annual/100)^(1/12) - 1`
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    (1.0 + annual_rate_percent / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Runs the simulation month by month. Month 1 grows the initial capital only. From month 2 on
/// the contribution is added before the month's growth is applied.
///
/// # Errors
/// Returns a `Validation` error when there is nothing to invest, when any input is negative or
/// not a number, when `years` is zero or above `MAX_YEARS`, or when the result is too large to be
/// represented.
pub fn simulate_growth(input: &SimulationInput) -> Result<Simulation> {
    validate(input)?;

    let rate = monthly_rate(input.annual_rate_percent);
    let months = input.years as usize * 12;
    let mut invested = Vec::with_capacity(months);
    let mut accumulated = Vec::with_capacity(months);

    let mut total_invested = input.initial;
    let mut total = input.initial;
    for month in 1..=months {
        if month > 1 {
            total_invested += input.contribution;
            total += input.contribution;
        }
        total *= 1.0 + rate;
        invested.push(total_invested);
        accumulated.push(total);
    }
    if !total.is_finite() {
        return Err(Error::validation(format!(
            "The projection grows too large to compute over {} year(s) at {}% a year",
            input.years, input.annual_rate_percent
        )));
    }

    let summary = ProjectionSummary {
        final_invested: total_invested,
        final_accumulated: total,
        interest_earned: total - total_invested,
        growth_percent: (total / total_invested - 1.0) * 100.0,
    };
    Ok(Simulation {
        monthly_rate: rate,
        invested,
        accumulated,
        summary,
    })
}

fn validate(input: &SimulationInput) -> Result<()> {
    let fields = [
        ("initial investment", input.initial),
        ("monthly contribution", input.contribution),
        ("annual rate", input.annual_rate_percent),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(Error::validation(format!("The {name} must be a number")));
        }
        if value < 0.0 {
            return Err(Error::validation(format!(
                "The {name} cannot be negative, got {value}"
            )));
        }
    }
    if input.initial <= 0.0 && input.contribution <= 0.0 {
        return Err(Error::validation(
            "Enter an initial investment or a monthly contribution greater than zero",
        ));
    }
    if input.years < 1 {
        return Err(Error::validation("The period must be at least one year"));
    }
    if input.years > MAX_YEARS {
        return Err(Error::validation(format!(
            "The period cannot be longer than {MAX_YEARS} years, got {}",
            input.years
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_zero_rate_no_contribution() {
        let input = SimulationInput {
            initial: 1000.0,
            contribution: 0.0,
            annual_rate_percent: 0.0,
            years: 1,
        };
        let sim = simulate_growth(&input).unwrap();
        assert_eq!(sim.accumulated.len(), 12);
        assert!(sim.accumulated.iter().all(|v| close(*v, 1000.0)));
        assert!(close(sim.summary.final_invested, 1000.0));
        assert!(close(sim.summary.interest_earned, 0.0));
        assert!(close(sim.summary.growth_percent, 0.0));
    }

    #[test]
    fn test_contribution_only() {
        let input = SimulationInput {
            initial: 0.0,
            contribution: 100.0,
            annual_rate_percent: 12.0,
            years: 1,
        };
        let sim = simulate_growth(&input).unwrap();
        let r = 1.12_f64.powf(1.0 / 12.0) - 1.0;
        assert!(close(sim.monthly_rate, r));
        assert!(close(sim.accumulated[0], 0.0));
        assert!(close(sim.accumulated[1], 100.0 * (1.0 + r)));
        assert!(close(sim.summary.final_invested, 1100.0));

        // closed form: 100 deposited at the start of months 2..=12
        let expected: f64 = (1..=11).map(|k| 100.0 * (1.0 + r).powi(k)).sum();
        assert!(close(sim.summary.final_accumulated, expected));
        assert!(sim.summary.interest_earned > 0.0);
    }

    #[test]
    fn test_annual_rate_compounds_to_annual() {
        let input = SimulationInput {
            initial: 1000.0,
            contribution: 0.0,
            annual_rate_percent: 10.0,
            years: 2,
        };
        let sim = simulate_growth(&input).unwrap();
        assert!(close(sim.accumulated[11], 1100.0));
        assert!(close(sim.summary.final_accumulated, 1210.0));
        assert!(close(sim.summary.growth_percent, 21.0));
        assert!(sim.invested.iter().all(|v| close(*v, 1000.0)));
    }

    #[test]
    fn test_defaults_run() {
        let sim = simulate_growth(&SimulationInput::default()).unwrap();
        assert_eq!(sim.invested.len(), 60);
        assert!(close(sim.summary.final_invested, 1000.0 + 59.0 * 100.0));
    }

    #[test]
    fn test_rejects_nothing_to_invest() {
        let input = SimulationInput {
            initial: 0.0,
            contribution: 0.0,
            ..SimulationInput::default()
        };
        assert!(simulate_growth(&input).unwrap_err().is_validation());
    }

    #[test]
    fn test_rejects_negative_and_zero_years() {
        let negative = SimulationInput {
            contribution: -1.0,
            ..SimulationInput::default()
        };
        let err = simulate_growth(&negative).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("monthly contribution"));

        let no_years = SimulationInput {
            years: 0,
            ..SimulationInput::default()
        };
        assert!(simulate_growth(&no_years).unwrap_err().is_validation());

        let nan = SimulationInput {
            annual_rate_percent: f64::NAN,
            ..SimulationInput::default()
        };
        assert!(simulate_growth(&nan).unwrap_err().is_validation());
    }

    #[test]
    fn test_period_limit() {
        let longest = SimulationInput {
            years: MAX_YEARS,
            ..SimulationInput::default()
        };
        assert_eq!(simulate_growth(&longest).unwrap().invested.len(), 1200);

        let too_long = SimulationInput {
            years: u32::MAX,
            ..SimulationInput::default()
        };
        let err = simulate_growth(&too_long).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("100 years"));
    }

    #[test]
    fn test_rejects_result_that_overflows() {
        let input = SimulationInput {
            annual_rate_percent: 1.0e300,
            years: 100,
            ..SimulationInput::default()
        };
        assert!(simulate_growth(&input).unwrap_err().is_validation());
    }
}
