use super::config::LineConfig;
use super::error::InvariantViolation;
use super::event::StationId;

/// Bounded counter on the directed link between two adjacent stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLink {
    level: u32,
    capacity: u32,
}

impl BufferLink {
    pub fn new(capacity: u32) -> Self {
        Self { level: 0, capacity }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    pub fn is_full(&self) -> bool {
        self.level >= self.capacity
    }
}

/// A processing stage with a counted server pool. The server count models
/// capacity only; nothing runs in parallel.
#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    servers: u32,
    busy: u32,
    /// Link the station draws from; `None` for the first station, which
    /// draws from an unbounded source.
    upstream: Option<usize>,
    /// Link the station pushes into; `None` for the terminal station, whose
    /// output leaves the line.
    downstream: Option<usize>,
}

impl Station {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn servers(&self) -> u32 {
        self.servers
    }

    pub fn busy(&self) -> u32 {
        self.busy
    }

    pub fn upstream_link(&self) -> Option<usize> {
        self.upstream
    }

    pub fn downstream_link(&self) -> Option<usize> {
        self.downstream
    }
}

/// What happened to the unit a completing station released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitMove {
    /// Pushed into the downstream link.
    Forwarded,
    /// Left the line at the terminal station.
    Terminal,
}

/// All mutable line state: server pools, link levels and the source counter.
/// Owned by the run loop; handlers are the only writers.
#[derive(Debug, Clone)]
pub struct LineState {
    stations: Vec<Station>,
    links: Vec<BufferLink>,
    units_formed: u64,
}

impl LineState {
    /// Build the linear topology described by the config. Assumes the config
    /// has already been validated.
    pub fn from_config(config: &LineConfig) -> Self {
        let count = config.stations.len();
        let stations = config
            .stations
            .iter()
            .enumerate()
            .map(|(i, sc)| Station {
                name: sc.name.clone(),
                servers: sc.servers,
                busy: 0,
                upstream: if i > 0 { Some(i - 1) } else { None },
                downstream: if i + 1 < count { Some(i) } else { None },
            })
            .collect();
        let links = config
            .link_capacities
            .iter()
            .map(|&capacity| BufferLink::new(capacity))
            .collect();
        Self {
            stations,
            links,
            units_formed: 0,
        }
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id]
    }

    pub fn links(&self) -> &[BufferLink] {
        &self.links
    }

    /// Units drawn from the unbounded source so far. A unit counts as soon
    /// as the first station claims a server for it, so at any instant
    /// `units_formed` equals cases out plus buffered plus busy.
    pub fn units_formed(&self) -> u64 {
        self.units_formed
    }

    /// Units currently sitting in link buffers.
    pub fn total_buffered(&self) -> u64 {
        self.links.iter().map(|l| u64::from(l.level)).sum()
    }

    /// Units currently held by busy servers.
    pub fn total_busy(&self) -> u64 {
        self.stations.iter().map(|s| u64::from(s.busy)).sum()
    }

    pub fn has_free_server(&self, id: StationId) -> bool {
        let station = &self.stations[id];
        station.busy < station.servers
    }

    /// True when the station can draw a unit to work on.
    pub fn input_available(&self, id: StationId) -> bool {
        match self.stations[id].upstream {
            Some(link) => !self.links[link].is_empty(),
            None => true,
        }
    }

    /// True when the station has somewhere to put its output.
    pub fn output_open(&self, id: StationId) -> bool {
        match self.stations[id].downstream {
            Some(link) => !self.links[link].is_full(),
            None => true,
        }
    }

    /// Claim a server for one unit of work. The first station draws the
    /// unit from the unbounded source here.
    pub fn begin_work(&mut self, id: StationId, time: f64) -> Result<(), InvariantViolation> {
        let station = &mut self.stations[id];
        if station.busy >= station.servers {
            return Err(InvariantViolation::BusyAboveServers {
                station: station.name.clone(),
                time,
            });
        }
        station.busy += 1;
        if station.upstream.is_none() {
            self.units_formed += 1;
        }
        Ok(())
    }

    /// Release a server and move exactly one unit across the station:
    /// decrement the upstream link, increment the downstream link (or
    /// report a terminal exit).
    pub fn complete_work(
        &mut self,
        id: StationId,
        time: f64,
    ) -> Result<UnitMove, InvariantViolation> {
        let (upstream, downstream) = {
            let station = &mut self.stations[id];
            if station.busy == 0 {
                return Err(InvariantViolation::NegativeBusy {
                    station: station.name.clone(),
                    time,
                });
            }
            station.busy -= 1;
            (station.upstream, station.downstream)
        };

        if let Some(link) = upstream {
            if self.links[link].level == 0 {
                return Err(InvariantViolation::BufferUnderflow { link, time });
            }
            self.links[link].level -= 1;
        }

        match downstream {
            Some(link) => {
                if self.links[link].is_full() {
                    return Err(InvariantViolation::BufferOverflow { link, time });
                }
                self.links[link].level += 1;
                Ok(UnitMove::Forwarded)
            }
            None => Ok(UnitMove::Terminal),
        }
    }
}
