pub mod core;

// Re-export commonly used types
pub use crate::core::calendar::ProductionCalendar;
pub use crate::core::config::{ClockTime, DurationSpec, LineConfig, PauseWindow, StationConfig};
pub use crate::core::duration::{DurationProvider, FixedDurations, SampledDurations};
pub use crate::core::error::{ConfigError, DurationError, InvariantViolation, ScheduleError, SimulationError};
pub use crate::core::event::{EventKind, PauseId, StationId};
pub use crate::core::event_scheduler::EventScheduler;
pub use crate::core::pallet::{CompletionRecord, PalletTracker};
pub use crate::core::pause::{PauseKind, PauseLogRecord};
pub use crate::core::simulation_engine::{RunReport, Simulation};
