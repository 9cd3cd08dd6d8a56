use super::calendar::ProductionCalendar;
use super::config::{hhmmss, LineConfig};
use super::duration::{DurationProvider, SampledDurations};
use super::error::{DurationError, SimulationError};
use super::event::{EventKind, StationId};
use super::event_scheduler::EventScheduler;
use super::line::{LineState, UnitMove};
use super::pallet::{CompletionRecord, PalletTracker};
use super::pause::{PauseController, PauseLogRecord};
use log::{debug, info};
use serde::Serialize;

/// In-memory result of a completed run. Serialization of any of this is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub cases_out: u64,
    pub pallets_out: u32,
    pub completions: Vec<CompletionRecord>,
    pub pause_log: Vec<PauseLogRecord>,
}

/// The packaging-line simulation: one event queue, one calendar, one line
/// state object, processed strictly sequentially. Handlers run to completion
/// between event pops; nothing polls.
pub struct Simulation {
    scheduler: EventScheduler,
    calendar: ProductionCalendar,
    line: LineState,
    pauses: PauseController,
    tracker: PalletTracker,
    durations: Box<dyn DurationProvider>,
    now: f64,
    shift_end: f64,
}

impl Simulation {
    /// Build a simulation with an explicit duration provider.
    pub fn new(
        config: &LineConfig,
        durations: Box<dyn DurationProvider>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let calendar = ProductionCalendar::from_config(config)?;
        let line = LineState::from_config(config);
        let pauses = PauseController::from_config(config);
        let tracker = PalletTracker::new(config.cases_per_pallet);

        let mut scheduler = EventScheduler::new();
        for station in 0..line.station_count() {
            scheduler.schedule(calendar.run_start(), EventKind::Try(station))?;
        }
        pauses.schedule_all(&mut scheduler)?;

        let now = calendar.run_start();
        let shift_end = calendar.shift_end();
        Ok(Self {
            scheduler,
            calendar,
            line,
            pauses,
            tracker,
            durations,
            now,
            shift_end,
        })
    }

    /// Build a simulation drawing durations from the configured
    /// distributions, seeded from the config.
    pub fn from_config(config: &LineConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let provider = SampledDurations::from_config(config)?;
        Self::new(config, Box::new(provider))
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn line(&self) -> &LineState {
        &self.line
    }

    pub fn cases_out(&self) -> u64 {
        self.tracker.cases_out()
    }

    /// Process events until the queue empties or the shift-end cutoff is
    /// reached, whichever comes first. An event due at or after the cutoff is
    /// discarded along with everything behind it; in-flight work is not
    /// drained.
    pub fn run(&mut self) -> Result<RunReport, SimulationError> {
        while let Some(event) = self.scheduler.pop_next() {
            if event.time >= self.shift_end {
                debug!(
                    "shift end {} reached; discarding {} queued events",
                    hhmmss(self.shift_end),
                    self.scheduler.len() + 1
                );
                break;
            }
            self.now = event.time;
            debug!("t={} dispatch {:?}", hhmmss(self.now), event.kind);
            match event.kind {
                EventKind::Try(station) => self.try_start(station)?,
                EventKind::Done(station) => self.on_done(station)?,
                EventKind::PauseStart(pause) => {
                    self.pauses
                        .on_pause_start(pause, &mut self.tracker, &mut self.scheduler);
                }
                EventKind::PauseEnd(pause) => {
                    self.pauses
                        .on_pause_end(pause, self.line.station_count(), &mut self.scheduler)?;
                }
            }
        }
        Ok(self.report())
    }

    fn report(&self) -> RunReport {
        RunReport {
            cases_out: self.tracker.cases_out(),
            pallets_out: self.tracker.pallets_out(),
            completions: self.tracker.completions().to_vec(),
            pause_log: self.pauses.log().to_vec(),
        }
    }

    /// Guarded start attempt. Any failed guard simply leaves the station
    /// dormant; a later Done or PauseEnd notification re-invokes this
    /// handler. No retry is self-scheduled here.
    fn try_start(&mut self, station: StationId) -> Result<(), SimulationError> {
        if !self.calendar.is_open(self.now)
            || !self.line.has_free_server(station)
            || !self.line.input_available(station)
            || !self.line.output_open(station)
        {
            return Ok(());
        }

        let duration = self.durations.duration(station);
        if !duration.is_finite() || duration < 0.0 {
            return Err(DurationError::InvalidSample {
                station,
                value: duration,
            }
            .into());
        }

        self.line.begin_work(station, self.now)?;
        self.scheduler
            .schedule(self.now + duration, EventKind::Done(station))?;
        Ok(())
    }

    /// Completion handler: move the unit, feed the pallet tracker at the
    /// terminal station, then notify self, upstream and downstream so every
    /// neighbor whose guard state just changed re-evaluates.
    fn on_done(&mut self, station: StationId) -> Result<(), SimulationError> {
        let moved = self.line.complete_work(station, self.now)?;
        if moved == UnitMove::Terminal {
            if let Some(record) = self.tracker.record_case(self.now) {
                info!(
                    "pallet {} at {} [COMPLETE]",
                    record.sequence,
                    hhmmss(record.time)
                );
            }
        }

        self.scheduler.schedule(self.now, EventKind::Try(station))?;
        if station > 0 {
            self.scheduler
                .schedule(self.now, EventKind::Try(station - 1))?;
        }
        if station + 1 < self.line.station_count() {
            self.scheduler
                .schedule(self.now, EventKind::Try(station + 1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ClockTime, DurationSpec, StationConfig};
    use crate::core::duration::FixedDurations;

    fn minimal_config(stations: usize, shift_minutes: u32) -> LineConfig {
        LineConfig {
            shift_start: ClockTime::new(0, 0),
            shift_end: ClockTime::new(0, shift_minutes),
            prep_minutes: 0,
            cleanup_minutes: 0,
            breaks: Vec::new(),
            downtimes: Vec::new(),
            stations: (0..stations)
                .map(|i| {
                    StationConfig::new(&format!("S{i}"), 1, DurationSpec::Fixed { seconds: 1.0 })
                })
                .collect(),
            link_capacities: vec![1_000_000; stations.saturating_sub(1)],
            cases_per_pallet: 1_000_000,
            seed: 0,
            jitter_pct: 0.0,
        }
    }

    #[test]
    fn test_single_station_produces_once_per_duration() {
        let config = minimal_config(1, 1); // 60 s shift
        let provider = FixedDurations::uniform_line(1, 1.0);
        let mut sim = Simulation::new(&config, Box::new(provider)).unwrap();
        let report = sim.run().unwrap();
        // Completions at t = 1..=59; the one due at t = 60 hits the cutoff.
        assert_eq!(report.cases_out, 59);
    }

    #[test]
    fn test_invalid_duration_sample_halts_the_run() {
        struct Broken;
        impl DurationProvider for Broken {
            fn duration(&mut self, _station: StationId) -> f64 {
                -1.0
            }
        }
        let config = minimal_config(1, 1);
        let mut sim = Simulation::new(&config, Box::new(Broken)).unwrap();
        assert!(matches!(
            sim.run(),
            Err(SimulationError::Duration(DurationError::InvalidSample { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let mut config = minimal_config(2, 1);
        config.link_capacities[0] = 0;
        assert!(Simulation::from_config(&config).is_err());
    }

    #[test]
    fn test_no_work_starts_before_run_start() {
        let mut config = minimal_config(1, 10);
        config.prep_minutes = 5;
        let provider = FixedDurations::uniform_line(1, 60.0);
        let mut sim = Simulation::new(&config, Box::new(provider)).unwrap();
        let report = sim.run().unwrap();
        // Work starts at t = 300 and takes 60 s; the shift ends at 600, so
        // completions land at 360, 420, 480 and 540.
        assert_eq!(report.cases_out, 4);
        assert!(sim.now() >= 300.0);
    }
}
