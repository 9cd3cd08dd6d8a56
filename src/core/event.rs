/// Index of a station along the line, front to back.
pub type StationId = usize;

/// Index of a scheduled pause (breaks first, then downtimes).
pub type PauseId = usize;

/// The closed set of event kinds the simulation dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A pause interval begins.
    PauseStart(PauseId),
    /// A pause interval ends.
    PauseEnd(PauseId),
    /// A station finishes processing one unit.
    Done(StationId),
    /// A station re-evaluates its start guards.
    Try(StationId),
}

impl EventKind {
    /// Tie-break priority for events sharing a timestamp. Lower runs first.
    ///
    /// Pause boundaries resolve before work events at the same instant, and
    /// completions update buffers before any retry re-reads them. Events with
    /// equal time and priority run in insertion order.
    pub fn priority(&self) -> u8 {
        match self {
            EventKind::PauseStart(_) => 0,
            EventKind::PauseEnd(_) => 1,
            EventKind::Done(_) => 2,
            EventKind::Try(_) => 3,
        }
    }

    /// True for station completion events, the only kind a pause may retime.
    pub fn is_done(&self) -> bool {
        matches!(self, EventKind::Done(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_is_total() {
        let kinds = [
            EventKind::PauseStart(0),
            EventKind::PauseEnd(0),
            EventKind::Done(0),
            EventKind::Try(0),
        ];
        for window in kinds.windows(2) {
            assert!(window[0].priority() < window[1].priority());
        }
    }

    #[test]
    fn test_is_done_only_matches_completions() {
        assert!(EventKind::Done(3).is_done());
        assert!(!EventKind::Try(3).is_done());
        assert!(!EventKind::PauseStart(0).is_done());
        assert!(!EventKind::PauseEnd(0).is_done());
    }
}
