use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{
    Clock, QuarterRecord, RandSource, SimulationError, SimulationParameters, SimulationSummary,
    SystemClock, TARGET_BAND_LOWER, TARGET_BAND_UPPER, run_simulation_with,
};

pub const MAX_QUARTERS: u32 = 400;

const REAL_RETURN_TREND_THRESHOLD: f64 = 0.5;
const LOW_VOLATILITY_BELOW: f64 = 0.3;
const MEDIUM_VOLATILITY_BELOW: f64 = 0.5;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid parameter payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("{field} must be {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Partial parameter set sent by a front end. Missing fields keep their
/// defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParametersPayload {
    #[serde(alias = "duration")]
    pub quarters: Option<u32>,
    #[serde(alias = "taylor_sensitivity", alias = "sensitivity")]
    pub taylor_sensitivity: Option<f64>,
    #[serde(alias = "cpi_volatility", alias = "volatility")]
    pub cpi_volatility: Option<f64>,
    #[serde(alias = "inflation_persistence", alias = "persistence")]
    pub inflation_persistence: Option<f64>,
    #[serde(alias = "starting_cash_rate")]
    pub starting_cash_rate: Option<f64>,
    #[serde(alias = "starting_inflation")]
    pub starting_inflation: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRequest {
    pub parameters: SimulationParameters,
    pub seed: Option<u64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityBand {
    Low,
    Medium,
    High,
}

impl VolatilityBand {
    pub fn classify(cpi_volatility: f64) -> Self {
        if cpi_volatility < LOW_VOLATILITY_BELOW {
            VolatilityBand::Low
        } else if cpi_volatility < MEDIUM_VOLATILITY_BELOW {
            VolatilityBand::Medium
        } else {
            VolatilityBand::High
        }
    }
}

/// Headline indicators shown next to the charts.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    pub inflation_trend: Trend,
    pub real_return_trend: Trend,
    pub volatility_band: VolatilityBand,
}

impl Highlights {
    pub fn from_summary(summary: &SimulationSummary, cpi_volatility: f64) -> Self {
        let inflation_trend = if summary.avg_inflation > TARGET_BAND_UPPER {
            Trend::Up
        } else if summary.avg_inflation < TARGET_BAND_LOWER {
            Trend::Down
        } else {
            Trend::Neutral
        };
        let real_return_trend = if summary.cagr_real > REAL_RETURN_TREND_THRESHOLD {
            Trend::Up
        } else {
            Trend::Down
        };

        Self {
            inflation_trend,
            real_return_trend,
            volatility_band: VolatilityBand::classify(cpi_volatility),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub parameters: SimulationParameters,
    pub seed: Option<u64>,
    pub data: Vec<QuarterRecord>,
    pub summary: SimulationSummary,
    pub highlights: Highlights,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn request_from_json(json: &str) -> Result<SimulationRequest, RequestError> {
    let payload = serde_json::from_str::<ParametersPayload>(json)?;
    request_from_payload(payload)
}

pub fn request_from_payload(payload: ParametersPayload) -> Result<SimulationRequest, RequestError> {
    let mut parameters = SimulationParameters::default();

    if let Some(v) = payload.quarters {
        parameters.quarters = v;
    }
    if let Some(v) = payload.taylor_sensitivity {
        parameters.taylor_sensitivity = v;
    }
    if let Some(v) = payload.cpi_volatility {
        parameters.cpi_volatility = v;
    }
    if let Some(v) = payload.inflation_persistence {
        parameters.inflation_persistence = v;
    }
    if let Some(v) = payload.starting_cash_rate {
        parameters.starting_cash_rate = v;
    }
    if let Some(v) = payload.starting_inflation {
        parameters.starting_inflation = v;
    }

    validate_ranges(&parameters)?;

    Ok(SimulationRequest {
        parameters,
        seed: payload.seed,
    })
}

fn validate_ranges(p: &SimulationParameters) -> Result<(), RequestError> {
    if !(1..=MAX_QUARTERS).contains(&p.quarters) {
        return Err(RequestError::OutOfRange {
            field: "quarters",
            expected: "between 1 and 400",
        });
    }

    let checks: [(&'static str, f64, bool, &'static str); 5] = [
        (
            "taylorSensitivity",
            p.taylor_sensitivity,
            p.taylor_sensitivity > 0.0 && p.taylor_sensitivity <= 10.0,
            "> 0 and <= 10",
        ),
        (
            "cpiVolatility",
            p.cpi_volatility,
            (0.0..=5.0).contains(&p.cpi_volatility),
            "between 0 and 5",
        ),
        (
            "inflationPersistence",
            p.inflation_persistence,
            (-1.0..=1.0).contains(&p.inflation_persistence),
            "between -1 and 1",
        ),
        (
            "startingCashRate",
            p.starting_cash_rate,
            (0.0..=25.0).contains(&p.starting_cash_rate),
            "between 0 and 25",
        ),
        (
            "startingInflation",
            p.starting_inflation,
            (-5.0..=50.0).contains(&p.starting_inflation),
            "between -5 and 50",
        ),
    ];

    for (field, value, in_range, expected) in checks {
        if !value.is_finite() || !in_range {
            return Err(RequestError::OutOfRange { field, expected });
        }
    }

    Ok(())
}

/// Runs a request against the wall clock, seeded when the request carries a
/// seed.
pub fn simulate_request(request: &SimulationRequest) -> Result<SimulationResponse, RequestError> {
    simulate_request_with_clock(request, &SystemClock)
}

pub fn simulate_request_with_clock<C: Clock + ?Sized>(
    request: &SimulationRequest,
    clock: &C,
) -> Result<SimulationResponse, RequestError> {
    let params = &request.parameters;
    let result = match request.seed {
        Some(seed) => {
            debug!(seed, "using seeded randomness");
            run_simulation_with(params, &mut RandSource::seeded(seed), clock)?
        }
        None => run_simulation_with(params, &mut RandSource::entropy(), clock)?,
    };

    Ok(SimulationResponse {
        parameters: *params,
        seed: request.seed,
        highlights: Highlights::from_summary(&result.summary, params.cpi_volatility),
        data: result.data,
        summary: result.summary,
    })
}

pub fn response_json(response: &SimulationResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}

/// Parses, runs, and serializes in one step. Both arms carry a JSON body;
/// failures are shaped as `{"error": "..."}`.
pub fn respond_json(json: &str) -> Result<String, String> {
    let response = request_from_json(json)
        .and_then(|request| simulate_request(&request))
        .map_err(|err| {
            warn!(error = %err, "rejected simulation request");
            error_body(&err.to_string())
        })?;

    response_json(&response).map_err(|err| error_body(&err.to_string()))
}

fn error_body(msg: &str) -> String {
    let body = ErrorResponse {
        error: msg.to_string(),
    };
    serde_json::to_string(&body).unwrap_or_else(|_| format!("{{\"error\":{msg:?}}}"))
}
