use super::config::{hhmmss, LineConfig};
use super::error::ScheduleError;
use super::event::{EventKind, PauseId};
use super::event_scheduler::EventScheduler;
use super::pallet::PalletTracker;
use log::{info, warn};
use serde::Serialize;

/// Breaks close the production calendar; downtimes only retime in-flight
/// completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PauseKind {
    Break,
    Downtime,
}

impl PauseKind {
    pub fn label(&self) -> &'static str {
        match self {
            PauseKind::Break => "BREAK",
            PauseKind::Downtime => "DOWNTIME",
        }
    }
}

/// Lifecycle of one scheduled pause. Transitions are fired solely by the
/// PauseStart/PauseEnd events; there is no other path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseState {
    Scheduled,
    Active,
    Ended,
}

#[derive(Debug, Clone)]
struct Pause {
    kind: PauseKind,
    start: f64,
    end: f64,
    state: PauseState,
}

/// One row of the pause log. Start-of-pause rows carry batch progress; the
/// INCOMPLETE projection rows carry the interrupted batch index; end rows
/// carry neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PauseLogRecord {
    pub label: String,
    pub time: f64,
    pub in_pallet_cases: Option<u64>,
    pub pallet_size: Option<u64>,
    pub projected_pallet: Option<u64>,
}

/// Reacts to pause boundary events: retimes queued completions, arms the
/// pallet lock and keeps the pause log. Operates on the timeline globally,
/// independent of any single station.
pub struct PauseController {
    pauses: Vec<Pause>,
    log: Vec<PauseLogRecord>,
}

impl PauseController {
    /// Breaks first, then downtimes; the pause id is the index into that
    /// combined list.
    pub fn from_config(config: &LineConfig) -> Self {
        let mut pauses = Vec::with_capacity(config.breaks.len() + config.downtimes.len());
        for window in &config.breaks {
            let (start, end) = window.bounds();
            pauses.push(Pause {
                kind: PauseKind::Break,
                start,
                end,
                state: PauseState::Scheduled,
            });
        }
        for window in &config.downtimes {
            let (start, end) = window.bounds();
            pauses.push(Pause {
                kind: PauseKind::Downtime,
                start,
                end,
                state: PauseState::Scheduled,
            });
        }
        Self {
            pauses,
            log: Vec::new(),
        }
    }

    /// Schedule exactly one PauseStart and one PauseEnd event per pause.
    pub fn schedule_all(&self, scheduler: &mut EventScheduler) -> Result<(), ScheduleError> {
        for (id, pause) in self.pauses.iter().enumerate() {
            scheduler.schedule(pause.start, EventKind::PauseStart(id))?;
            scheduler.schedule(pause.end, EventKind::PauseEnd(id))?;
        }
        Ok(())
    }

    pub fn log(&self) -> &[PauseLogRecord] {
        &self.log
    }

    pub fn into_log(self) -> Vec<PauseLogRecord> {
        self.log
    }

    /// Handle a PauseStart event: project the interrupted batch, arm the
    /// pallet lock, and push every queued `Done` strictly inside the pause
    /// forward by its length. `Try` events due during the pause are left
    /// alone; they fire, find the calendar closed, and no-op.
    pub fn on_pause_start(
        &mut self,
        id: PauseId,
        tracker: &mut PalletTracker,
        scheduler: &mut EventScheduler,
    ) {
        let pause = &mut self.pauses[id];
        if pause.state != PauseState::Scheduled {
            warn!(
                "ignoring start of pause {} in state {:?}",
                id, pause.state
            );
            return;
        }
        pause.state = PauseState::Active;
        let (kind, start, end) = (pause.kind, pause.start, pause.end);

        let projection = tracker.lock_for_pause();
        if let Some(index) = projection.projected_pallet {
            info!("pallet {} at {} [INCOMPLETE]", index, hhmmss(start));
            self.log.push(PauseLogRecord {
                label: format!("{}_PALLET_INCOMPLETE", kind.label()),
                time: start,
                in_pallet_cases: None,
                pallet_size: None,
                projected_pallet: Some(index),
            });
        }
        info!(
            "{}_START {} -> {} | pallet progress {}/{}",
            kind.label(),
            hhmmss(start),
            hhmmss(end),
            projection.in_pallet,
            tracker.cases_per_pallet()
        );
        self.log.push(PauseLogRecord {
            label: format!("{}_START", kind.label()),
            time: start,
            in_pallet_cases: Some(projection.in_pallet),
            pallet_size: Some(tracker.cases_per_pallet()),
            projected_pallet: None,
        });

        let shifted = scheduler.shift_done_within(start, end);
        if shifted > 0 {
            info!("retimed {} in-flight completions by {}s", shifted, end - start);
        }
    }

    /// Handle a PauseEnd event: log it and wake every station with a `Try`
    /// at the pause end, whether or not it was actually starved.
    pub fn on_pause_end(
        &mut self,
        id: PauseId,
        station_count: usize,
        scheduler: &mut EventScheduler,
    ) -> Result<(), ScheduleError> {
        let pause = &mut self.pauses[id];
        if pause.state != PauseState::Active {
            warn!("ignoring end of pause {} in state {:?}", id, pause.state);
            return Ok(());
        }
        pause.state = PauseState::Ended;
        let (kind, end) = (pause.kind, pause.end);

        info!("{}_END   {}", kind.label(), hhmmss(end));
        self.log.push(PauseLogRecord {
            label: format!("{}_END", kind.label()),
            time: end,
            in_pallet_cases: None,
            pallet_size: None,
            projected_pallet: None,
        });

        for station in 0..station_count {
            scheduler.schedule(end, EventKind::Try(station))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ClockTime, PauseWindow};

    fn controller_with_break(start_min: u32, end_min: u32) -> PauseController {
        let config = LineConfig {
            breaks: vec![PauseWindow::new(
                ClockTime::new(0, start_min),
                ClockTime::new(0, end_min),
            )],
            downtimes: Vec::new(),
            ..LineConfig::default()
        };
        PauseController::from_config(&config)
    }

    #[test]
    fn test_schedule_all_emits_one_start_and_one_end_per_pause() {
        let controller = controller_with_break(1, 2);
        let mut scheduler = EventScheduler::new();
        controller.schedule_all(&mut scheduler).unwrap();
        assert_eq!(scheduler.len(), 2);
        assert_eq!(scheduler.pop_next().unwrap().kind, EventKind::PauseStart(0));
        assert_eq!(scheduler.pop_next().unwrap().kind, EventKind::PauseEnd(0));
    }

    #[test]
    fn test_pause_start_mid_batch_arms_lock_and_logs_projection() {
        let mut controller = controller_with_break(1, 2);
        let mut tracker = PalletTracker::new(108);
        let mut scheduler = EventScheduler::new();
        for t in 0..200 {
            tracker.record_case(t as f64);
        }

        controller.on_pause_start(0, &mut tracker, &mut scheduler);

        assert!(tracker.lock_active());
        assert_eq!(controller.log().len(), 2);
        let projection = &controller.log()[0];
        assert_eq!(projection.label, "BREAK_PALLET_INCOMPLETE");
        assert_eq!(projection.projected_pallet, Some(2));
        let start = &controller.log()[1];
        assert_eq!(start.label, "BREAK_START");
        assert_eq!(start.in_pallet_cases, Some(92));
        assert_eq!(start.pallet_size, Some(108));
    }

    #[test]
    fn test_pause_start_on_boundary_logs_no_projection() {
        let mut controller = controller_with_break(1, 2);
        let mut tracker = PalletTracker::new(10);
        let mut scheduler = EventScheduler::new();
        for t in 0..20 {
            tracker.record_case(t as f64);
        }

        controller.on_pause_start(0, &mut tracker, &mut scheduler);

        assert!(!tracker.lock_active());
        assert_eq!(controller.log().len(), 1);
        assert_eq!(controller.log()[0].label, "BREAK_START");
        assert_eq!(controller.log()[0].in_pallet_cases, Some(0));
    }

    #[test]
    fn test_pause_start_retimes_inflight_completions() {
        let mut controller = controller_with_break(1, 2); // [60, 120)
        let mut tracker = PalletTracker::new(10);
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(75.0, EventKind::Done(0)).unwrap();
        scheduler.schedule(90.0, EventKind::Done(1)).unwrap();
        scheduler.schedule(80.0, EventKind::Try(2)).unwrap();

        controller.on_pause_start(0, &mut tracker, &mut scheduler);

        let mut events: Vec<(EventKind, f64)> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|e| (e.kind, e.time))
            .collect();
        events.sort_by(|a, b| a.1.total_cmp(&b.1));
        assert_eq!(
            events,
            vec![
                (EventKind::Try(2), 80.0),
                (EventKind::Done(0), 135.0),
                (EventKind::Done(1), 150.0),
            ]
        );
    }

    #[test]
    fn test_pause_end_wakes_every_station() {
        let mut controller = controller_with_break(1, 2);
        let mut tracker = PalletTracker::new(10);
        let mut scheduler = EventScheduler::new();
        controller.on_pause_start(0, &mut tracker, &mut scheduler);
        controller.on_pause_end(0, 4, &mut scheduler).unwrap();

        let wakes: Vec<EventKind> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            wakes,
            vec![
                EventKind::Try(0),
                EventKind::Try(1),
                EventKind::Try(2),
                EventKind::Try(3),
            ]
        );
        assert_eq!(controller.log().last().unwrap().label, "BREAK_END");
    }

    #[test]
    fn test_state_machine_ignores_out_of_order_events() {
        let mut controller = controller_with_break(1, 2);
        let mut tracker = PalletTracker::new(10);
        let mut scheduler = EventScheduler::new();

        // End before start: no transition, no log, no wake.
        controller.on_pause_end(0, 3, &mut scheduler).unwrap();
        assert!(controller.log().is_empty());
        assert!(!scheduler.has_events());

        controller.on_pause_start(0, &mut tracker, &mut scheduler);
        let log_len = controller.log().len();
        // A second start is ignored.
        controller.on_pause_start(0, &mut tracker, &mut scheduler);
        assert_eq!(controller.log().len(), log_len);
    }
}
