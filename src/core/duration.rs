use super::config::{DurationSpec, LineConfig};
use super::error::ConfigError;
use super::event::StationId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Triangular};

/// Injected capability supplying per-unit processing times.
///
/// The core calls this once per successful start and rejects negative or
/// non-finite samples at the call site; implementations are expected to be
/// deterministic for a given seed.
pub trait DurationProvider {
    /// Processing time in seconds for one unit at `station`.
    fn duration(&mut self, station: StationId) -> f64;
}

/// Constant per-station durations. Mainly useful for tests and capacity
/// back-of-envelope runs.
pub struct FixedDurations {
    per_station: Vec<f64>,
}

impl FixedDurations {
    pub fn new(per_station: Vec<f64>) -> Self {
        Self { per_station }
    }

    /// The same duration for every station on a line of `stations` stages.
    pub fn uniform_line(stations: usize, seconds: f64) -> Self {
        Self::new(vec![seconds; stations])
    }
}

impl DurationProvider for FixedDurations {
    fn duration(&mut self, station: StationId) -> f64 {
        self.per_station[station]
    }
}

enum Sampler {
    Fixed(f64),
    Uniform(f64, f64),
    Triangular(Triangular<f64>),
}

/// Seeded random durations drawn from each station's configured
/// distribution, with the optional multiplicative jitter applied on top.
pub struct SampledDurations {
    samplers: Vec<Sampler>,
    jitter_pct: f64,
    rng: StdRng,
}

impl SampledDurations {
    pub fn from_config(config: &LineConfig) -> Result<Self, ConfigError> {
        let mut samplers = Vec::with_capacity(config.stations.len());
        for station in &config.stations {
            let sampler = match station.timing {
                DurationSpec::Fixed { seconds } => Sampler::Fixed(seconds),
                DurationSpec::Uniform { low, high } => Sampler::Uniform(low, high),
                DurationSpec::Triangular { low, mode, high } => {
                    let dist = Triangular::new(low, high, mode).map_err(|e| {
                        ConfigError::InvalidDurationSpec {
                            station: station.name.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    Sampler::Triangular(dist)
                }
            };
            samplers.push(sampler);
        }
        Ok(Self {
            samplers,
            jitter_pct: config.jitter_pct,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn jitter(&mut self, base: f64) -> f64 {
        if self.jitter_pct <= 0.0 {
            return base;
        }
        let factor = 1.0 + self.rng.gen_range(-self.jitter_pct..=self.jitter_pct);
        (base * factor).max(0.001)
    }
}

impl DurationProvider for SampledDurations {
    fn duration(&mut self, station: StationId) -> f64 {
        let base = match &self.samplers[station] {
            Sampler::Fixed(seconds) => *seconds,
            Sampler::Uniform(low, high) => self.rng.gen_range(*low..=*high),
            Sampler::Triangular(dist) => dist.sample(&mut self.rng),
        };
        self.jitter(base)
    }
}
