use std::f64::consts::PI;

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of uniform draws in the half-open interval (0, 1].
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;
}

/// Adapts any `rand` generator into a [`UniformSource`].
#[derive(Debug, Clone)]
pub struct RandSource<R> {
    rng: R,
}

impl<R: Rng> RandSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandSource<ThreadRng> {
    pub fn entropy() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RandSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformSource for RandSource<R> {
    fn next_unit(&mut self) -> f64 {
        // gen::<f64>() is in [0, 1); flip it so ln(u1) stays finite.
        1.0 - self.rng.r#gen::<f64>()
    }
}

/// Replays a fixed list of uniforms, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct FixedUniforms {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedUniforms {
    /// Values outside (0, 1] are clamped into it. An empty list replays 1.0,
    /// which yields a zero shock.
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() {
            vec![1.0]
        } else {
            values
                .into_iter()
                .map(|v| v.clamp(f64::MIN_POSITIVE, 1.0))
                .collect()
        };
        Self { values, cursor: 0 }
    }

    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for FixedUniforms {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Box-Muller: two uniforms in, one normal deviate out. The sine branch is
/// discarded so every quarter consumes exactly two uniforms.
pub fn gaussian<S: UniformSource + ?Sized>(source: &mut S, mean: f64, std_dev: f64) -> f64 {
    let u1 = source.next_unit();
    let u2 = source.next_unit();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + z * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_one_draw_gives_zero_shock() {
        let mut source = FixedUniforms::new(vec![1.0, 0.3]);
        let value = gaussian(&mut source, 0.0, 5.0);
        assert!(value.abs() < 1e-12, "got {value}");
        assert_eq!(source.draws(), 2);
    }

    #[test]
    fn known_uniforms_produce_one_standard_deviation() {
        // sqrt(-2 ln(e^-0.5)) = 1 and cos(2pi) = 1
        let mut source = FixedUniforms::new(vec![(-0.5_f64).exp(), 1.0]);
        let value = gaussian(&mut source, 2.0, 0.4);
        assert!((value - 2.4).abs() < 1e-12, "got {value}");
    }

    #[test]
    fn fixed_uniforms_wrap_around() {
        let mut source = FixedUniforms::new(vec![0.25, 0.5]);
        let drawn: Vec<f64> = (0..5).map(|_| source.next_unit()).collect();
        assert_eq!(drawn, vec![0.25, 0.5, 0.25, 0.5, 0.25]);
    }

    #[test]
    fn fixed_uniforms_clamp_zero_into_open_interval() {
        let mut source = FixedUniforms::new(vec![0.0]);
        let u = source.next_unit();
        assert!(u > 0.0 && u <= 1.0);
        assert!(gaussian(&mut source, 0.0, 1.0).is_finite());
    }

    #[test]
    fn seeded_sources_are_reproducible_and_in_range() {
        let mut a = RandSource::seeded(42);
        let mut b = RandSource::seeded(42);
        for _ in 0..1_000 {
            let left = a.next_unit();
            let right = b.next_unit();
            assert_eq!(left, right);
            assert!(left > 0.0 && left <= 1.0);
        }
    }

    #[test]
    fn entropy_gaussian_moments_are_plausible() {
        let mut source = RandSource::entropy();
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| gaussian(&mut source, 1.0, 0.5)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 1.0).abs() < 0.05, "mean {mean}");
        assert!((var.sqrt() - 0.5).abs() < 0.05, "std {}", var.sqrt());
    }
}
