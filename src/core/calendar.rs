use super::config::LineConfig;
use super::error::ConfigError;

/// The disjoint, ordered set of intervals in which new work may start.
///
/// Built from the shift bounds adjusted by the prep and cleanup offsets, with
/// every break interval subtracted (clipping overlaps, splitting an interval
/// in two, or deleting it outright). Downtimes are deliberately not
/// subtracted here: they only retime in-flight completions through the pause
/// controller and do not gate new starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionCalendar {
    windows: Vec<(f64, f64)>,
    run_start: f64,
    shift_end: f64,
}

impl ProductionCalendar {
    pub fn from_config(config: &LineConfig) -> Result<Self, ConfigError> {
        let shift_start = config.shift_start.as_seconds();
        let shift_end = config.shift_end.as_seconds();
        let run_start = shift_start + f64::from(config.prep_minutes) * 60.0;
        let run_end = shift_end - f64::from(config.cleanup_minutes) * 60.0;
        let breaks: Vec<(f64, f64)> = config.breaks.iter().map(|b| b.bounds()).collect();
        Self::build(run_start, run_end, shift_end, &breaks)
    }

    /// Assemble the window set from an explicit base interval and break list.
    pub fn build(
        run_start: f64,
        run_end: f64,
        shift_end: f64,
        breaks: &[(f64, f64)],
    ) -> Result<Self, ConfigError> {
        if run_end <= run_start {
            return Err(ConfigError::EmptyProductionWindow);
        }
        let mut windows = vec![(run_start, run_end)];
        for &(break_start, break_end) in breaks {
            if break_start >= break_end {
                return Err(ConfigError::MalformedInterval {
                    start: break_start,
                    end: break_end,
                });
            }
            let mut next = Vec::with_capacity(windows.len() + 1);
            for (start, end) in windows {
                if break_end <= start || break_start >= end {
                    next.push((start, end));
                } else {
                    if start < break_start {
                        next.push((start, break_start));
                    }
                    if break_end < end {
                        next.push((break_end, end));
                    }
                }
            }
            windows = next;
        }
        if windows.is_empty() {
            return Err(ConfigError::EmptyProductionWindow);
        }
        Ok(Self {
            windows,
            run_start,
            shift_end,
        })
    }

    /// True iff `t` lies inside some window, half-open: `start <= t < end`.
    pub fn is_open(&self, t: f64) -> bool {
        self.windows.iter().any(|&(start, end)| start <= t && t < end)
    }

    /// Earliest instant at which work may start.
    pub fn run_start(&self) -> f64 {
        self.run_start
    }

    /// Hard cutoff for the run loop.
    pub fn shift_end(&self) -> f64 {
        self.shift_end
    }

    pub fn windows(&self) -> &[(f64, f64)] {
        &self.windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_breaks_yields_single_window() {
        let calendar = ProductionCalendar::build(100.0, 500.0, 600.0, &[]).unwrap();
        assert_eq!(calendar.windows(), &[(100.0, 500.0)]);
    }

    #[test]
    fn test_break_splits_window() {
        let calendar = ProductionCalendar::build(0.0, 100.0, 100.0, &[(40.0, 60.0)]).unwrap();
        assert_eq!(calendar.windows(), &[(0.0, 40.0), (60.0, 100.0)]);
    }

    #[test]
    fn test_break_clips_leading_edge() {
        let calendar = ProductionCalendar::build(50.0, 100.0, 100.0, &[(40.0, 70.0)]).unwrap();
        assert_eq!(calendar.windows(), &[(70.0, 100.0)]);
    }

    #[test]
    fn test_break_covering_everything_is_an_error() {
        let result = ProductionCalendar::build(50.0, 100.0, 100.0, &[(0.0, 200.0)]);
        assert_eq!(result, Err(ConfigError::EmptyProductionWindow));
    }

    #[test]
    fn test_inverted_run_interval_is_an_error() {
        let result = ProductionCalendar::build(100.0, 100.0, 200.0, &[]);
        assert_eq!(result, Err(ConfigError::EmptyProductionWindow));
    }

    #[test]
    fn test_is_open_half_open_semantics() {
        let calendar = ProductionCalendar::build(0.0, 100.0, 100.0, &[(40.0, 60.0)]).unwrap();
        assert!(calendar.is_open(0.0));
        assert!(calendar.is_open(39.999));
        assert!(!calendar.is_open(40.0)); // window end is exclusive
        assert!(!calendar.is_open(59.999));
        assert!(calendar.is_open(60.0)); // window start is inclusive
        assert!(!calendar.is_open(100.0));
    }

    #[test]
    fn test_from_config_applies_offsets_and_breaks() {
        let config = LineConfig::default();
        let calendar = ProductionCalendar::from_config(&config).unwrap();
        // 14:45 + 15 min prep = 15:00; 22:45 - 15 min cleanup = 22:30.
        assert_eq!(calendar.run_start(), 15.0 * 3600.0);
        assert_eq!(calendar.shift_end(), 22.0 * 3600.0 + 45.0 * 60.0);
        assert_eq!(calendar.windows().len(), 4); // three breaks split the shift
        assert!(!calendar.is_open(17.0 * 3600.0 + 300.0)); // inside first break
        assert!(calendar.is_open(18.0 * 3600.0));
    }
}
