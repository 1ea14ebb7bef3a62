//! Random size draws.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sizing::{clamp_to_bounds, round_size, Distribution, SizeRange, SizeSettings};

// == Size Sampler ==
/// Draws size multipliers from a configured range.
#[derive(Debug, Clone)]
pub struct SizeSampler {
    rng: StdRng,
}

impl SizeSampler {
    /// Creates a sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a deterministic sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // == Draw ==
    /// Draws one size for `range`, rounded to two decimal digits.
    ///
    /// Uniform draws always land inside the range. Normal draws accept tail
    /// samples outside the range unless `clamp_to_range` is set; either way
    /// the result stays within the absolute size bounds.
    pub fn draw(&mut self, range: SizeRange, settings: &SizeSettings) -> f32 {
        match settings.distribution {
            Distribution::Uniform => {
                let raw = self
                    .rng
                    .gen_range(f64::from(range.min)..=f64::from(range.max));
                range.clamp(round_size(raw))
            }
            Distribution::Normal => {
                let deviation = range.span() / f64::from(settings.spread_divisor);
                let raw = range.midpoint() + deviation * self.standard_normal();
                let size = round_size(raw);
                let size = if settings.clamp_to_range {
                    range.clamp(size)
                } else {
                    size
                };
                clamp_to_bounds(size)
            }
        }
    }

    /// Box-Muller sample from the standard normal distribution.
    fn standard_normal(&mut self) -> f64 {
        // 1 - [0, 1) keeps the logarithm's argument away from zero
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::{MAX_SIZE, MIN_SIZE};

    fn uniform_settings() -> SizeSettings {
        SizeSettings {
            distribution: Distribution::Uniform,
            ..SizeSettings::default()
        }
    }

    #[test]
    fn test_uniform_draws_respect_range() {
        let mut sampler = SizeSampler::seeded(11);
        let settings = uniform_settings();
        let range = SizeRange::new(0.9, 1.1);

        let draws: Vec<f32> = (0..10_000).map(|_| sampler.draw(range, &settings)).collect();

        assert!(draws.iter().all(|size| range.contains(*size)));
        let mean = draws.iter().map(|s| f64::from(*s)).sum::<f64>() / draws.len() as f64;
        assert!((mean - 1.0).abs() < 0.005, "mean was {}", mean);
    }

    #[test]
    fn test_draws_are_rounded() {
        let mut sampler = SizeSampler::seeded(3);
        let settings = SizeSettings::default();

        for _ in 0..500 {
            let size = sampler.draw(settings.default_range, &settings);
            let scaled = f64::from(size) * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-3, "{} not rounded", size);
        }
    }

    #[test]
    fn test_normal_draws_centre_on_midpoint() {
        let mut sampler = SizeSampler::seeded(5);
        let settings = SizeSettings::default();
        let range = SizeRange::new(1.0, 2.0);

        let mean = (0..10_000)
            .map(|_| f64::from(sampler.draw(range, &settings)))
            .sum::<f64>()
            / 10_000.0;
        assert!((mean - 1.5).abs() < 0.01, "mean was {}", mean);
    }

    #[test]
    fn test_normal_draws_may_leave_range_unless_clamped() {
        let wide = SizeSettings {
            spread_divisor: 2.0,
            ..SizeSettings::default()
        };
        let range = SizeRange::new(0.9, 1.1);

        let mut sampler = SizeSampler::seeded(17);
        let outside = (0..5_000)
            .map(|_| sampler.draw(range, &wide))
            .filter(|size| !range.contains(*size))
            .count();
        assert!(outside > 0);

        let clamped = SizeSettings {
            clamp_to_range: true,
            ..wide
        };
        let mut sampler = SizeSampler::seeded(17);
        assert!((0..5_000).all(|_| range.contains(sampler.draw(range, &clamped))));
    }

    #[test]
    fn test_normal_draws_stay_within_absolute_bounds() {
        let settings = SizeSettings {
            spread_divisor: 2.0,
            ..SizeSettings::default()
        };
        let range = SizeRange::new(MIN_SIZE, MAX_SIZE);
        let mut sampler = SizeSampler::seeded(23);

        for _ in 0..5_000 {
            let size = sampler.draw(range, &settings);
            assert!((MIN_SIZE..=MAX_SIZE).contains(&size));
        }
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let settings = SizeSettings::default();
        let mut a = SizeSampler::seeded(99);
        let mut b = SizeSampler::seeded(99);

        for _ in 0..20 {
            assert_eq!(
                a.draw(settings.default_range, &settings),
                b.draw(settings.default_range, &settings)
            );
        }
    }
}
