//! Toy central-bank reaction function simulator.
//!
//! `core` runs a quarter-by-quarter Taylor-rule path against AR(1)
//! inflation. `interface` parses parameter payloads and shapes the
//! serializable response consumed by charting front ends.

pub mod core;
pub mod interface;
