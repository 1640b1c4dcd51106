mod calendar;
mod engine;
mod error;
mod random;
mod types;

pub use calendar::{Clock, FixedClock, SystemClock, quarter_label};
pub use engine::{annualize_two_quarters, quarterly_from_annual, run_simulation, run_simulation_with};
pub use error::SimulationError;
pub use random::{FixedUniforms, RandSource, UniformSource, gaussian};
pub use types::{
    CASH_RATE_FLOOR, HISTORICAL_MEAN_CPI_Q, MAX_RATE_MOVE, NEUTRAL_NOMINAL_RATE,
    NEUTRAL_REAL_RATE, PolicyStance, QuarterRecord, RATE_STEP, SimulationParameters,
    SimulationResult, SimulationSummary, TARGET_BAND_LOWER, TARGET_BAND_UPPER, TARGET_MIDPOINT,
};
