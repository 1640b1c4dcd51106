use serde::Serialize;

pub const TARGET_MIDPOINT: f64 = 2.5;
pub const TARGET_BAND_LOWER: f64 = 2.0;
pub const TARGET_BAND_UPPER: f64 = 3.0;
pub const NEUTRAL_REAL_RATE: f64 = 0.5;
pub const NEUTRAL_NOMINAL_RATE: f64 = NEUTRAL_REAL_RATE + TARGET_MIDPOINT;

/// Long-run mean of quarterly CPI, roughly 2.5% annualized.
pub const HISTORICAL_MEAN_CPI_Q: f64 = 0.625;

pub const RATE_STEP: f64 = 0.25;
pub const MAX_RATE_MOVE: f64 = 0.50;
pub const CASH_RATE_FLOOR: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub quarters: u32,
    pub taylor_sensitivity: f64,
    pub cpi_volatility: f64,
    pub inflation_persistence: f64,
    pub starting_cash_rate: f64,
    pub starting_inflation: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            quarters: 40,
            taylor_sensitivity: 1.5,
            cpi_volatility: 0.4,
            inflation_persistence: 0.6,
            starting_cash_rate: 3.60,
            starting_inflation: 2.50,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStance {
    Accommodative,
    Restrictive,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterRecord {
    pub quarter_index: u32,
    pub date_label: String,
    pub cpi_quarterly: f64,
    pub cpi_annualized: f64,
    pub observed_inflation: f64,
    pub nominal_cash_rate: f64,
    pub rate_change: f64,
    pub real_cash_rate: f64,
    pub neutral_rate: f64,
    pub target_band_upper: f64,
    pub target_band_lower: f64,
    pub policy_stance: PolicyStance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub avg_inflation: f64,
    pub max_rate: f64,
    pub min_rate: f64,
    pub inflation_volatility: f64,
    pub cagr_nominal: f64,
    pub cagr_real: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub data: Vec<QuarterRecord>,
    pub summary: SimulationSummary,
}
