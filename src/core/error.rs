use thiserror::Error;

/// Rejected configuration, detected before any simulation state is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("link {link} must have a positive buffer capacity")]
    NonPositiveBufferCapacity { link: usize },

    #[error("expected {expected} link capacities for {stations} stations, got {got}")]
    LinkCountMismatch {
        expected: usize,
        stations: usize,
        got: usize,
    },

    #[error("cases_per_pallet must be positive")]
    NonPositivePalletSize,

    #[error("a line needs at least one station")]
    NoStations,

    #[error("station '{station}' must have at least one server")]
    NoServers { station: String },

    #[error("interval [{start}, {end}) is inverted or malformed")]
    MalformedInterval { start: f64, end: f64 },

    #[error("no production time remains after offsets and break subtraction")]
    EmptyProductionWindow,

    #[error("invalid duration spec for station '{station}': {reason}")]
    InvalidDurationSpec { station: String, reason: String },
}

/// Rejected event insertion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("cannot schedule an event at invalid time {0}")]
    InvalidTime(f64),
}

/// A logic defect surfaced by a defensive check. These halt the run; they are
/// never clamped or recovered from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("buffer underflow on link {link} at t={time}")]
    BufferUnderflow { link: usize, time: f64 },

    #[error("buffer overflow on link {link} at t={time}")]
    BufferOverflow { link: usize, time: f64 },

    #[error("station '{station}' released a server it did not hold at t={time}")]
    NegativeBusy { station: String, time: f64 },

    #[error("station '{station}' exceeded its server count at t={time}")]
    BusyAboveServers { station: String, time: f64 },
}

/// A duration provider produced a sample the core refuses to use.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DurationError {
    #[error("duration provider returned {value} for station {station}; samples must be finite and nonnegative")]
    InvalidSample { station: usize, value: f64 },
}

/// Any fatal condition a run can end with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Duration(#[from] DurationError),
}
