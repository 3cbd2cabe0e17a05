use std::collections::BTreeMap;

use tracing::info;

use crate::errors::AppError;
use crate::external::growth_provider::GrowthDataProvider;
use crate::models::{
    Asset, AssetType, Assumptions, Milestone, RunwayRequest, RunwayResponse, RunwayStatus,
    Strategy, YearProjection,
};
use crate::services::amortization::{self, PayoffResult};
use crate::services::growth_service;
use crate::services::rates;

/// Simulation horizon. Surviving all 50 years reads as an effectively
/// infinite runway.
pub const HORIZON_YEARS: u32 = 50;

const CRITICAL_THRESHOLD_YEARS: u32 = 10;

/// Fixed priority in which liquid buckets are drawn down to cover a funding
/// gap. Real estate is illiquid and never appears here.
pub const WITHDRAWAL_ORDER: [AssetType; 7] = [
    AssetType::Cash,
    AssetType::Deposit,
    AssetType::Bond,
    AssetType::Stock,
    AssetType::Etf,
    AssetType::Crypto,
    AssetType::Other,
];

#[derive(Debug, Clone)]
pub struct DebtState {
    pub name: String,
    pub balance: f64,
    pub annual_rate: f64,
    pub monthly_payment: f64,
}

/// Everything the year loop needs, fully resolved. Pure data: building a
/// plan does all the I/O and rate resolution up front so the simulation
/// itself is deterministic.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub buckets: BTreeMap<AssetType, f64>,
    pub growth_rates: BTreeMap<AssetType, f64>,
    pub debts: Vec<DebtState>,
    pub annual_expenses: f64,
    pub annual_passive_income: f64,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Depleted(u32),
    SurvivedHorizon,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub projection: Vec<YearProjection>,
    pub milestones: Vec<Milestone>,
    pub outcome: Outcome,
}

impl Simulation {
    pub fn runway_years(&self) -> u32 {
        match self.outcome {
            Outcome::Depleted(year) => year,
            Outcome::SurvivedHorizon => HORIZON_YEARS,
        }
    }

    pub fn status(&self) -> RunwayStatus {
        match self.outcome {
            Outcome::SurvivedHorizon => RunwayStatus::Infinite,
            Outcome::Depleted(year) if year < CRITICAL_THRESHOLD_YEARS => RunwayStatus::Critical,
            Outcome::Depleted(_) => RunwayStatus::Finite,
        }
    }
}

fn liquid_total(buckets: &BTreeMap<AssetType, f64>) -> f64 {
    buckets
        .iter()
        .filter(|(t, _)| **t != AssetType::RealEstate)
        .map(|(_, balance)| balance)
        .sum()
}

fn assets_total(buckets: &BTreeMap<AssetType, f64>) -> f64 {
    buckets.values().sum()
}

/// Year-by-year asset-depletion state machine. Each year: inflate expenses,
/// add payments on active debts, subtract passive income; withdraw any
/// positive gap from liquid buckets in the fixed order; grow what remains;
/// advance debts one year (principal = payment x 12 - balance x rate,
/// clamped at zero — annual grain, coarser than the monthly closed form in
/// the amortization module). Terminal states: liquid assets exhausted, or
/// the full horizon survived.
pub fn simulate(plan: &SimulationPlan) -> Simulation {
    let mut buckets = plan.buckets.clone();
    let mut debts = plan.debts.clone();
    let mut underwater_noted = vec![false; debts.len()];

    let mut projection = Vec::new();
    let mut milestones = Vec::new();

    let initial_debt_payments: f64 = debts
        .iter()
        .filter(|d| d.balance > 0.0)
        .map(|d| d.monthly_payment * 12.0)
        .sum();
    let initial_debts: f64 = debts.iter().map(|d| d.balance.max(0.0)).sum();

    projection.push(YearProjection {
        year: 0,
        net_worth: assets_total(&buckets) - initial_debts,
        assets: assets_total(&buckets),
        debts: initial_debts,
        expenses: plan.annual_expenses,
        passive_income: plan.annual_passive_income,
        gap: plan.annual_expenses + initial_debt_payments - plan.annual_passive_income,
        notes: None,
    });

    let mut outcome = Outcome::SurvivedHorizon;

    for year in 1..=HORIZON_YEARS {
        let mut notes: Vec<String> = Vec::new();

        let expenses = plan.annual_expenses * (1.0 + plan.inflation_rate).powi(year as i32);
        let debt_payments: f64 = debts
            .iter()
            .filter(|d| d.balance > 0.0)
            .map(|d| d.monthly_payment * 12.0)
            .sum();
        let gap = expenses + debt_payments - plan.annual_passive_income;

        // Cover the gap from liquid buckets, exhausting each before the next.
        if gap > 0.0 {
            let mut remaining = gap;
            for asset_type in WITHDRAWAL_ORDER {
                if remaining <= 0.0 {
                    break;
                }
                if let Some(balance) = buckets.get_mut(&asset_type) {
                    let withdrawal = remaining.min(*balance);
                    *balance -= withdrawal;
                    remaining -= withdrawal;
                }
            }
        }

        // Growth applies to post-withdrawal balances, kept buckets included.
        for (asset_type, balance) in buckets.iter_mut() {
            let rate = plan
                .growth_rates
                .get(asset_type)
                .copied()
                .unwrap_or_else(|| rates::default_growth_rate(*asset_type));
            *balance *= 1.0 + rate;
        }

        for (i, debt) in debts.iter_mut().enumerate() {
            if debt.balance <= 0.0 {
                continue;
            }
            let interest = debt.balance * debt.annual_rate;
            let principal = debt.monthly_payment * 12.0 - interest;
            if principal <= 0.0 {
                if !underwater_noted[i] {
                    notes.push(format!(
                        "{} is underwater: payments do not cover interest",
                        debt.name
                    ));
                    underwater_noted[i] = true;
                }
                continue;
            }
            let previous = debt.balance;
            debt.balance = (debt.balance - principal).max(0.0);
            if previous > 0.0 && debt.balance == 0.0 {
                milestones.push(Milestone {
                    year,
                    event: format!("{} paid off", debt.name),
                    impact: format!("-{:.0}/yr in debt payments", debt.monthly_payment * 12.0),
                });
            }
        }

        let total_assets = assets_total(&buckets);
        let total_debts: f64 = debts.iter().map(|d| d.balance).sum();

        projection.push(YearProjection {
            year,
            net_worth: total_assets - total_debts,
            assets: total_assets,
            debts: total_debts,
            expenses,
            passive_income: plan.annual_passive_income,
            gap,
            notes: (!notes.is_empty()).then(|| notes.join("; ")),
        });

        if liquid_total(&buckets) <= 0.0 {
            milestones.push(Milestone {
                year,
                event: "Liquid assets depleted".to_string(),
                impact: "Living expenses can no longer be funded".to_string(),
            });
            outcome = Outcome::Depleted(year);
            break;
        }
    }

    Simulation {
        projection,
        milestones,
        outcome,
    }
}

/// Builds a plan from the request: aggregate balances by type, resolve
/// inflation from the caller's region, and resolve one growth rate per type
/// (5y bucket, then an advisory historical lookup for ticker'd stock/etf
/// types, then defaults).
async fn build_plan(
    request: &RunwayRequest,
    growth: Option<&dyn GrowthDataProvider>,
) -> (SimulationPlan, Assumptions) {
    let region = rates::region_from_timezone(request.timezone.as_deref());
    let inflation = rates::resolve_inflation(region);

    let mut buckets: BTreeMap<AssetType, f64> = BTreeMap::new();
    for asset in &request.assets {
        *buckets.entry(asset.asset_type).or_insert(0.0) += asset.balance.max(0.0);
    }

    let mut growth_rates: BTreeMap<AssetType, f64> = BTreeMap::new();
    let mut rate_sources: Vec<String> = Vec::new();

    for asset_type in buckets.keys().copied() {
        // Largest holding of the type speaks for the bucket.
        let representative = request
            .assets
            .iter()
            .filter(|a| a.asset_type == asset_type)
            .max_by(|a, b| a.balance.total_cmp(&b.balance));

        let (rate, source) = resolve_bucket_rate(asset_type, representative, growth).await;
        rate_sources.push(format!("{} {:.1}% ({})", asset_type.as_str(), rate * 100.0, source));
        growth_rates.insert(asset_type, rate);
    }

    let assumptions = Assumptions {
        inflation_rate: inflation.default_rate,
        growth_rates: growth_rates
            .iter()
            .map(|(t, r)| (t.as_str().to_string(), *r))
            .collect(),
        reasoning: format!(
            "Inflation {:.1}% ({}). Growth per asset type: {}.",
            inflation.default_rate * 100.0,
            inflation.region,
            rate_sources.join(", ")
        ),
    };

    let debts = request
        .debts
        .iter()
        .map(|d| DebtState {
            name: d.name.clone(),
            balance: d.current_balance.max(0.0),
            annual_rate: d.interest_rate,
            monthly_payment: d.monthly_payment,
        })
        .collect();

    let plan = SimulationPlan {
        buckets,
        growth_rates,
        debts,
        annual_expenses: request.annual_expenses,
        annual_passive_income: request.annual_passive_income,
        inflation_rate: inflation.default_rate,
    };

    (plan, assumptions)
}

async fn resolve_bucket_rate(
    asset_type: AssetType,
    representative: Option<&Asset>,
    growth: Option<&dyn GrowthDataProvider>,
) -> (f64, &'static str) {
    let Some(asset) = representative else {
        return (rates::default_growth_rate(asset_type), "type default");
    };

    if let Some(map) = &asset.growth_rates {
        if !map.is_empty() {
            return (rates::resolve_asset_rate(asset), "client-supplied horizon bucket");
        }
    }

    // Advisory lookup for market-traded buckets only; any failure falls
    // through to the type default.
    if matches!(asset_type, AssetType::Stock | AssetType::Etf) {
        if let (Some(provider), Some(ticker)) = (growth, asset.ticker.as_deref()) {
            if let Some(rate) = growth_service::historical_growth(provider, ticker, 5)
                .await
                .rate()
            {
                return (rate, "5y historical");
            }
        }
    }

    (rates::default_growth_rate(asset_type), "type default")
}

fn build_strategy(buckets: &BTreeMap<AssetType, f64>) -> Strategy {
    let withdrawal_order = WITHDRAWAL_ORDER
        .iter()
        .filter(|t| buckets.contains_key(t))
        .map(|t| t.as_str().to_string())
        .collect();

    Strategy {
        withdrawal_order,
        keep_assets: vec![AssetType::RealEstate.as_str().to_string()],
        reasoning: "Spend cash-like holdings before market assets so growth compounds as long \
                    as possible; real estate is illiquid and never sold."
            .to_string(),
    }
}

fn build_suggestions(plan: &SimulationPlan, simulation: &Simulation) -> Vec<String> {
    let mut suggestions = Vec::new();

    for debt in &plan.debts {
        match amortization::payoff(debt.balance, debt.annual_rate, debt.monthly_payment) {
            PayoffResult::Underwater { shortfall, .. } => {
                suggestions.push(format!(
                    "Increase the payment on {} by more than {:.0}/mo: it does not cover the \
                     accruing interest, so the balance will never fall",
                    debt.name, shortfall
                ));
            }
            PayoffResult::Schedule(schedule)
                if schedule.total_interest > debt.balance * 0.5 =>
            {
                suggestions.push(format!(
                    "{} will cost about {:.0} in interest over its remaining {} months; \
                     consider paying it down faster",
                    debt.name, schedule.total_interest, schedule.months_remaining
                ));
            }
            _ => {}
        }
    }

    match simulation.status() {
        RunwayStatus::Critical => {
            let mut reduced = plan.clone();
            reduced.annual_expenses *= 0.9;
            let gained = simulate(&reduced)
                .runway_years()
                .saturating_sub(simulation.runway_years());
            if gained > 0 {
                suggestions.push(format!(
                    "Runway is under {} years; cutting living expenses by 10% would add roughly \
                     {} more",
                    CRITICAL_THRESHOLD_YEARS, gained
                ));
            } else {
                suggestions.push(format!(
                    "Runway is under {} years; consider reducing expenses or adding income",
                    CRITICAL_THRESHOLD_YEARS
                ));
            }
        }
        RunwayStatus::Infinite => {
            suggestions.push(
                "Passive income and growth cover projected expenses across the full horizon"
                    .to_string(),
            );
        }
        RunwayStatus::Finite => {}
    }

    let cash_like = plan.buckets.get(&AssetType::Cash).copied().unwrap_or(0.0)
        + plan.buckets.get(&AssetType::Deposit).copied().unwrap_or(0.0);
    let liquid = liquid_total(&plan.buckets);
    if liquid > 0.0 && cash_like / liquid > 0.5 {
        suggestions.push(
            "Over half of liquid assets sit in cash and deposits; consider whether more should \
             earn market growth"
                .to_string(),
        );
    }

    suggestions
}

/// Flags a declared annual-expense figure that disagrees with the recent
/// monthly history by more than 20%.
fn spending_drift_hint(request: &RunwayRequest) -> Option<String> {
    if request.monthly_history.is_empty() || request.annual_expenses <= 0.0 {
        return None;
    }
    let monthly_avg = request
        .monthly_history
        .iter()
        .map(|m| m.expenses)
        .sum::<f64>()
        / request.monthly_history.len() as f64;
    let declared = request.annual_expenses / 12.0;

    ((monthly_avg - declared).abs() / declared > 0.2).then(|| {
        format!(
            "Recent monthly spending (~{:.0}/mo) differs from the declared annual expenses \
             ({:.0}/mo); the projection uses the declared figure",
            monthly_avg, declared
        )
    })
}

/// Produces the full runway projection for a snapshot of assets, debts,
/// income and expenses. Deterministic apart from the advisory historical
/// growth lookup, which degrades silently to defaults.
pub async fn project_runway(
    request: &RunwayRequest,
    growth: Option<&dyn GrowthDataProvider>,
) -> Result<RunwayResponse, AppError> {
    for asset in &request.assets {
        if asset.balance < 0.0 {
            return Err(AppError::Validation(format!(
                "asset '{}' has a negative balance",
                asset.name
            )));
        }
    }
    for debt in &request.debts {
        if debt.current_balance < 0.0 || debt.monthly_payment < 0.0 {
            return Err(AppError::Validation(format!(
                "debt '{}' has a negative balance or payment",
                debt.name
            )));
        }
    }

    let (plan, assumptions) = build_plan(request, growth).await;
    let simulation = simulate(&plan);

    info!(
        "runway projection: {} years ({:?})",
        simulation.runway_years(),
        simulation.status()
    );

    let strategy = build_strategy(&plan.buckets);
    let mut suggestions = build_suggestions(&plan, &simulation);
    suggestions.extend(spending_drift_hint(request));

    Ok(RunwayResponse {
        assumptions,
        strategy,
        runway_years: simulation.runway_years(),
        runway_status: simulation.status(),
        suggestions,
        milestones: simulation.milestones,
        projection: simulation.projection,
    })
}
