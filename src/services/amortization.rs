use serde::Serialize;

// Base year used to turn a months-remaining count into a payoff date.
pub const BASE_YEAR: i32 = 2025;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoffSchedule {
    pub months_remaining: u32,
    pub total_interest: f64,
    pub payoff_year: i32,
    pub payoff_month: u32,
}

// Debt math edge cases are tagged results, never errors: an underwater debt
// or a nonsensical input is a legitimate answer for the simulator to record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoffResult {
    Schedule(PayoffSchedule),
    Underwater {
        monthly_interest: f64,
        shortfall: f64,
    },
    InvalidInput {
        reason: String,
    },
}

pub fn payoff(balance: f64, annual_rate: f64, monthly_payment: f64) -> PayoffResult {
    payoff_from(BASE_YEAR, balance, annual_rate, monthly_payment)
}

/// Closed-form fixed-payment amortization:
/// n = -ln(1 - r·P/M) / ln(1 + r), with r the monthly rate.
pub fn payoff_from(
    base_year: i32,
    balance: f64,
    annual_rate: f64,
    monthly_payment: f64,
) -> PayoffResult {
    if balance <= 0.0 {
        return PayoffResult::Schedule(PayoffSchedule {
            months_remaining: 0,
            total_interest: 0.0,
            payoff_year: base_year,
            payoff_month: 0,
        });
    }

    if monthly_payment <= 0.0 {
        return PayoffResult::InvalidInput {
            reason: "monthly payment must be positive".to_string(),
        };
    }

    let monthly_rate = annual_rate / 12.0;

    // No interest case (0% loans)
    if monthly_rate <= 0.0 {
        let months = (balance / monthly_payment).ceil() as u32;
        return PayoffResult::Schedule(PayoffSchedule {
            months_remaining: months,
            total_interest: 0.0,
            payoff_year: base_year + (months / 12) as i32,
            payoff_month: months % 12,
        });
    }

    let monthly_interest = balance * monthly_rate;
    if monthly_payment <= monthly_interest {
        return PayoffResult::Underwater {
            monthly_interest,
            shortfall: monthly_interest - monthly_payment,
        };
    }

    let log_arg = 1.0 - (monthly_rate * balance) / monthly_payment;
    if log_arg <= 0.0 || !log_arg.is_finite() {
        return PayoffResult::InvalidInput {
            reason: "unable to calculate - check inputs".to_string(),
        };
    }

    let months = (-log_arg.ln() / (1.0 + monthly_rate).ln()).ceil();
    if !months.is_finite() || months < 0.0 {
        return PayoffResult::InvalidInput {
            reason: "unable to calculate - check inputs".to_string(),
        };
    }
    let months = months as u32;

    let total_interest = months as f64 * monthly_payment - balance;

    PayoffResult::Schedule(PayoffSchedule {
        months_remaining: months,
        total_interest,
        payoff_year: base_year + (months / 12) as i32,
        payoff_month: months % 12,
    })
}
