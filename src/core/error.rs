use thiserror::Error;

/// Preconditions the engine checks before running the quarterly loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("quarters must be > 0")]
    ZeroQuarters,

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("cpi volatility must be >= 0, got {0}")]
    NegativeVolatility(f64),

    #[error("starting inflation must be > -100, got {0}")]
    InflationBelowTotalLoss(f64),
}
