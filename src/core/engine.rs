use tracing::{debug, trace};

use super::calendar::{Clock, SystemClock, quarter_label};
use super::error::SimulationError;
use super::random::{RandSource, UniformSource, gaussian};
use super::types::{
    CASH_RATE_FLOOR, HISTORICAL_MEAN_CPI_Q, MAX_RATE_MOVE, NEUTRAL_NOMINAL_RATE,
    NEUTRAL_REAL_RATE, PolicyStance, QuarterRecord, RATE_STEP, SimulationParameters,
    SimulationResult, SimulationSummary, TARGET_BAND_LOWER, TARGET_BAND_UPPER, TARGET_MIDPOINT,
};

/// The last two realized quarterly CPI prints, most recent first.
#[derive(Debug, Clone, Copy)]
struct InflationHistory {
    last: f64,
    before_last: f64,
}

impl InflationHistory {
    fn seeded(starting_annual_inflation: f64) -> Self {
        let quarterly = quarterly_from_annual(starting_annual_inflation);
        Self {
            last: quarterly,
            before_last: quarterly,
        }
    }

    /// What the policy-maker sees: the two prints before the current quarter.
    fn observed_annualized(self) -> f64 {
        annualize_two_quarters(self.last, self.before_last)
    }

    fn push(&mut self, cpi_quarterly: f64) {
        self.before_last = self.last;
        self.last = cpi_quarterly;
    }
}

#[derive(Debug, Clone, Copy)]
struct PolicyDecision {
    stance: PolicyStance,
    target_nominal: f64,
}

#[derive(Debug, Clone, Copy)]
struct RateMove {
    new_rate: f64,
    floored: bool,
}

#[derive(Debug, Clone, Copy)]
struct ReturnIndices {
    wealth: f64,
    price: f64,
}

impl ReturnIndices {
    fn new() -> Self {
        Self {
            wealth: 1.0,
            price: 1.0,
        }
    }

    fn accrue(&mut self, annual_cash_rate: f64, cpi_quarterly: f64) {
        self.wealth *= 1.0 + (annual_cash_rate / 100.0) / 4.0;
        self.price *= 1.0 + cpi_quarterly / 100.0;
    }

    /// Nominal and real CAGR in percent. Zero-length runs report 0, and a
    /// non-positive price level zeroes only the real figure.
    fn cagr(self, quarters: u32) -> (f64, f64) {
        let years = quarters as f64 / 4.0;
        if years <= 0.0 {
            return (0.0, 0.0);
        }
        let nominal = if self.wealth > 0.0 {
            (self.wealth.powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };
        let real = if self.wealth > 0.0 && self.price > 0.0 {
            ((self.wealth / self.price).powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };
        (finite_or_zero(nominal), finite_or_zero(real))
    }
}

/// Runs one simulation against thread-local entropy and the wall clock.
pub fn run_simulation(params: &SimulationParameters) -> Result<SimulationResult, SimulationError> {
    let mut source = RandSource::entropy();
    run_simulation_with(params, &mut source, &SystemClock)
}

pub fn run_simulation_with<S, C>(
    params: &SimulationParameters,
    source: &mut S,
    clock: &C,
) -> Result<SimulationResult, SimulationError>
where
    S: UniformSource + ?Sized,
    C: Clock + ?Sized,
{
    validate_parameters(params)?;

    debug!(
        quarters = params.quarters,
        taylor_sensitivity = params.taylor_sensitivity,
        cpi_volatility = params.cpi_volatility,
        inflation_persistence = params.inflation_persistence,
        starting_cash_rate = params.starting_cash_rate,
        starting_inflation = params.starting_inflation,
        "starting simulation"
    );

    let today = clock.today();
    let mut history = InflationHistory::seeded(params.starting_inflation);
    let mut cash_rate = params.starting_cash_rate;
    let mut indices = ReturnIndices::new();
    let mut data = Vec::with_capacity(params.quarters as usize);

    for quarter in 1..=params.quarters {
        let shock = gaussian(source, 0.0, params.cpi_volatility);
        let cpi_quarterly = next_quarterly_cpi(history.last, params.inflation_persistence, shock);

        let observed = history.observed_annualized();
        let decision = policy_decision(observed, params.taylor_sensitivity);

        let previous_rate = cash_rate;
        let rate_move = govern_rate_move(cash_rate, decision.target_nominal);
        if rate_move.floored {
            debug!(
                quarter,
                previous_rate,
                target_nominal = decision.target_nominal,
                "cash rate clamped to floor"
            );
        }
        cash_rate = rate_move.new_rate;

        indices.accrue(cash_rate, cpi_quarterly);

        let current_annualized = annualize_two_quarters(cpi_quarterly, history.last);

        trace!(
            quarter,
            cpi_quarterly,
            observed,
            stance = ?decision.stance,
            cash_rate,
            "quarter simulated"
        );

        data.push(QuarterRecord {
            quarter_index: quarter,
            date_label: quarter_label(today, quarter),
            cpi_quarterly: round2(cpi_quarterly),
            cpi_annualized: round2(current_annualized),
            observed_inflation: round2(observed),
            nominal_cash_rate: round2(cash_rate),
            rate_change: round2(cash_rate - previous_rate),
            real_cash_rate: round2(cash_rate - TARGET_MIDPOINT),
            neutral_rate: NEUTRAL_NOMINAL_RATE,
            target_band_upper: TARGET_BAND_UPPER,
            target_band_lower: TARGET_BAND_LOWER,
            policy_stance: decision.stance,
        });

        history.push(cpi_quarterly);
    }

    let summary = summarize(&data, indices, params.quarters);
    debug!(
        avg_inflation = summary.avg_inflation,
        min_rate = summary.min_rate,
        max_rate = summary.max_rate,
        cagr_nominal = summary.cagr_nominal,
        cagr_real = summary.cagr_real,
        "simulation complete"
    );

    Ok(SimulationResult { data, summary })
}

fn validate_parameters(params: &SimulationParameters) -> Result<(), SimulationError> {
    if params.quarters == 0 {
        return Err(SimulationError::ZeroQuarters);
    }

    for (field, value) in [
        ("taylorSensitivity", params.taylor_sensitivity),
        ("cpiVolatility", params.cpi_volatility),
        ("inflationPersistence", params.inflation_persistence),
        ("startingCashRate", params.starting_cash_rate),
        ("startingInflation", params.starting_inflation),
    ] {
        if !value.is_finite() {
            return Err(SimulationError::NonFinite { field });
        }
    }

    if params.cpi_volatility < 0.0 {
        return Err(SimulationError::NegativeVolatility(params.cpi_volatility));
    }

    // A -100% year has no quarterly root.
    if params.starting_inflation <= -100.0 {
        return Err(SimulationError::InflationBelowTotalLoss(
            params.starting_inflation,
        ));
    }

    Ok(())
}

/// Compound-equivalent quarterly rate, in percent, of an annual rate in percent.
pub fn quarterly_from_annual(annual_pct: f64) -> f64 {
    ((1.0 + annual_pct / 100.0).powf(0.25) - 1.0) * 100.0
}

/// Annualizes two consecutive quarterly prints by squaring their half-year growth.
pub fn annualize_two_quarters(recent_pct: f64, earlier_pct: f64) -> f64 {
    let half_year = (1.0 + recent_pct / 100.0) * (1.0 + earlier_pct / 100.0);
    (half_year.powi(2) - 1.0) * 100.0
}

fn next_quarterly_cpi(previous: f64, persistence: f64, shock: f64) -> f64 {
    HISTORICAL_MEAN_CPI_Q + persistence * (previous - HISTORICAL_MEAN_CPI_Q) + shock
}

fn policy_decision(observed: f64, sensitivity: f64) -> PolicyDecision {
    let (stance, deviation) = if observed < TARGET_BAND_LOWER {
        (
            PolicyStance::Accommodative,
            sensitivity * (observed - TARGET_MIDPOINT),
        )
    } else if observed > TARGET_BAND_UPPER {
        (
            PolicyStance::Restrictive,
            sensitivity * (observed - TARGET_MIDPOINT),
        )
    } else {
        (PolicyStance::Neutral, 0.0)
    };

    let target_real = NEUTRAL_REAL_RATE + deviation;
    PolicyDecision {
        stance,
        target_nominal: target_real + TARGET_MIDPOINT,
    }
}

/// Quantize to the 25bp grid, clamp to +/-50bp, then apply the floor.
fn govern_rate_move(current_rate: f64, target_nominal: f64) -> RateMove {
    let raw_diff = target_nominal - current_rate;
    let desired = round_half_up(raw_diff / RATE_STEP) * RATE_STEP;
    let desired = desired.clamp(-MAX_RATE_MOVE, MAX_RATE_MOVE);

    let moved = current_rate + desired;
    if moved < CASH_RATE_FLOOR {
        RateMove {
            new_rate: CASH_RATE_FLOOR,
            floored: true,
        }
    } else {
        RateMove {
            new_rate: moved,
            floored: false,
        }
    }
}

// Ties go toward +inf, so -2.5 steps becomes -2.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Two-decimal display rounding on the exact decimal expansion of `value`,
/// ties away from zero, so 2.675 (stored as 2.67499...) becomes 2.67.
fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let exact = format!("{:.80}", value.abs());
    let Some((whole, frac)) = exact.split_once('.') else {
        return value;
    };
    let Ok(whole) = whole.parse::<u64>() else {
        return value;
    };
    if whole > 1 << 50 {
        return value;
    }

    let digits = frac.as_bytes();
    let cents_part = u64::from(digits[0] - b'0') * 10 + u64::from(digits[1] - b'0');
    let round_up = digits[2] >= b'5';
    let cents = whole * 100 + cents_part + u64::from(round_up);

    let rounded = (cents as f64 / 100.0).copysign(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn summarize(data: &[QuarterRecord], indices: ReturnIndices, quarters: u32) -> SimulationSummary {
    let (cagr_nominal, cagr_real) = indices.cagr(quarters);
    if data.is_empty() {
        return SimulationSummary {
            avg_inflation: 0.0,
            max_rate: 0.0,
            min_rate: 0.0,
            inflation_volatility: 0.0,
            cagr_nominal,
            cagr_real,
        };
    }

    let n = data.len() as f64;
    let avg_inflation = data.iter().map(|r| r.cpi_annualized).sum::<f64>() / n;
    let variance = data
        .iter()
        .map(|r| (r.cpi_annualized - avg_inflation).powi(2))
        .sum::<f64>()
        / n;
    let max_rate = data
        .iter()
        .map(|r| r.nominal_cash_rate)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_rate = data
        .iter()
        .map(|r| r.nominal_cash_rate)
        .fold(f64::INFINITY, f64::min);

    SimulationSummary {
        avg_inflation: finite_or_zero(avg_inflation),
        max_rate: finite_or_zero(max_rate),
        min_rate: finite_or_zero(min_rate),
        inflation_volatility: finite_or_zero(variance.sqrt()),
        cagr_nominal,
        cagr_real,
    }
}
