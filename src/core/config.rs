use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Wall-clock instant within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Seconds from midnight.
    pub fn as_seconds(&self) -> f64 {
        f64::from(self.hour * 3600 + self.minute * 60)
    }
}

/// Render seconds-from-midnight as `hh:mm:ss`, wrapping at 24 h.
pub fn hhmmss(seconds: f64) -> String {
    let t = (seconds as i64).rem_euclid(24 * 3600);
    format!("{:02}:{:02}:{:02}", t / 3600, (t % 3600) / 60, t % 60)
}

/// A scheduled break or downtime interval, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl PauseWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.start.as_seconds(), self.end.as_seconds())
    }
}

/// Per-station processing-time distribution, in seconds per unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DurationSpec {
    Fixed { seconds: f64 },
    Uniform { low: f64, high: f64 },
    Triangular { low: f64, mode: f64, high: f64 },
}

impl DurationSpec {
    fn validate(&self, station: &str) -> Result<(), ConfigError> {
        let reject = |reason: &str| {
            Err(ConfigError::InvalidDurationSpec {
                station: station.to_string(),
                reason: reason.to_string(),
            })
        };
        match *self {
            DurationSpec::Fixed { seconds } => {
                if !seconds.is_finite() || seconds < 0.0 {
                    return reject("fixed duration must be finite and nonnegative");
                }
            }
            DurationSpec::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
                    return reject("uniform bounds must satisfy 0 <= low <= high");
                }
            }
            DurationSpec::Triangular { low, mode, high } => {
                if !low.is_finite() || !mode.is_finite() || !high.is_finite() {
                    return reject("triangular bounds must be finite");
                }
                if low < 0.0 || low > mode || mode > high || low >= high {
                    return reject("triangular bounds must satisfy 0 <= low <= mode <= high, low < high");
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    pub servers: u32,
    pub timing: DurationSpec,
}

impl StationConfig {
    pub fn new(name: &str, servers: u32, timing: DurationSpec) -> Self {
        Self {
            name: name.to_string(),
            servers,
            timing,
        }
    }
}

/// Everything a run consumes: shift bounds, pauses, line layout, pallet size
/// and the seed handed to the duration provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    pub shift_start: ClockTime,
    pub shift_end: ClockTime,
    /// Minutes between shift start and first possible work start.
    pub prep_minutes: u32,
    /// Minutes reserved for cleanup before shift end.
    pub cleanup_minutes: u32,
    pub breaks: Vec<PauseWindow>,
    pub downtimes: Vec<PauseWindow>,
    pub stations: Vec<StationConfig>,
    /// One capacity per link between adjacent stations, front to back.
    pub link_capacities: Vec<u32>,
    pub cases_per_pallet: u32,
    pub seed: u64,
    /// Extra multiplicative jitter applied to every drawn duration, as a
    /// fraction (0.05 = plus or minus 5%). Zero disables it.
    pub jitter_pct: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            shift_start: ClockTime::new(14, 45),
            shift_end: ClockTime::new(22, 45),
            prep_minutes: 15,
            cleanup_minutes: 15,
            breaks: vec![
                PauseWindow::new(ClockTime::new(17, 0), ClockTime::new(17, 15)),
                PauseWindow::new(ClockTime::new(19, 0), ClockTime::new(19, 20)),
                PauseWindow::new(ClockTime::new(21, 0), ClockTime::new(21, 10)),
            ],
            downtimes: Vec::new(),
            stations: vec![
                StationConfig::new("CaseFormer", 1, DurationSpec::Fixed { seconds: 2.5 }),
                StationConfig::new("Separator", 1, DurationSpec::Fixed { seconds: 3.0 }),
                StationConfig::new("B1", 1, DurationSpec::Uniform { low: 3.0, high: 5.0 }),
                StationConfig::new("B2", 1, DurationSpec::Uniform { low: 3.0, high: 5.0 }),
                StationConfig::new("B3", 1, DurationSpec::Uniform { low: 3.0, high: 5.0 }),
                StationConfig::new("B4", 1, DurationSpec::Uniform { low: 3.0, high: 5.0 }),
                StationConfig::new("GlueDate", 1, DurationSpec::Fixed { seconds: 1.0 }),
                StationConfig::new(
                    "Palletizer",
                    1,
                    DurationSpec::Uniform { low: 2.0, high: 3.3333333333 },
                ),
            ],
            link_capacities: vec![32, 32, 6, 6, 6, 16, 64],
            cases_per_pallet: 108,
            seed: 123,
            jitter_pct: 0.0,
        }
    }
}

impl LineConfig {
    /// Reject malformed configuration before any simulation state is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations.is_empty() {
            return Err(ConfigError::NoStations);
        }
        let expected = self.stations.len() - 1;
        if self.link_capacities.len() != expected {
            return Err(ConfigError::LinkCountMismatch {
                expected,
                stations: self.stations.len(),
                got: self.link_capacities.len(),
            });
        }
        for (link, &capacity) in self.link_capacities.iter().enumerate() {
            if capacity == 0 {
                return Err(ConfigError::NonPositiveBufferCapacity { link });
            }
        }
        if self.cases_per_pallet == 0 {
            return Err(ConfigError::NonPositivePalletSize);
        }
        for station in &self.stations {
            if station.servers == 0 {
                return Err(ConfigError::NoServers {
                    station: station.name.clone(),
                });
            }
            station.timing.validate(&station.name)?;
        }
        let (shift_start, shift_end) = (self.shift_start.as_seconds(), self.shift_end.as_seconds());
        if shift_start >= shift_end {
            return Err(ConfigError::MalformedInterval {
                start: shift_start,
                end: shift_end,
            });
        }
        for window in self.breaks.iter().chain(&self.downtimes) {
            let (start, end) = window.bounds();
            if start >= end {
                return Err(ConfigError::MalformedInterval { start, end });
            }
        }
        Ok(())
    }
}
