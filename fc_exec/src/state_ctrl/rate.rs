//! Tick based scheduling of the controller stages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::StateCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Decides on which ticks a stage running at a fixed rate is due.
///
/// A stage is due on every tick that is a multiple of the ratio between the tick rate and the
/// stage rate, starting from tick zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateGate {
    divider: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RateGate {
    /// Build the gate for a stage called `name` running at `rate_hz` within a `tick_rate_hz`
    /// loop.
    ///
    /// The stage rate must be non-zero, no faster than the tick rate, and divide it exactly.
    pub fn new(name: &'static str, tick_rate_hz: u32, rate_hz: u32) -> Result<Self, StateCtrlError> {
        if tick_rate_hz == 0 {
            return Err(StateCtrlError::ZeroRate("tick"));
        }
        if rate_hz == 0 {
            return Err(StateCtrlError::ZeroRate(name));
        }
        if rate_hz > tick_rate_hz {
            return Err(StateCtrlError::FasterThanTick {
                name,
                rate_hz,
                tick_rate_hz,
            });
        }
        if tick_rate_hz % rate_hz != 0 {
            return Err(StateCtrlError::NotADivisor {
                name,
                rate_hz,
                tick_rate_hz,
            });
        }

        Ok(Self {
            divider: tick_rate_hz / rate_hz,
        })
    }

    /// True if the stage shall run on this tick.
    pub fn is_due(&self, tick: u32) -> bool {
        tick % self.divider == 0
    }

    /// Number of ticks between two runs of the stage.
    pub fn divider(&self) -> u32 {
        self.divider
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gating() {
        let att = RateGate::new("attitude", 1000, 500).unwrap();
        let pos = RateGate::new("position", 1000, 100).unwrap();
        let every = RateGate::new("all", 1000, 1000).unwrap();

        assert_eq!(att.divider(), 2);
        assert_eq!(pos.divider(), 10);

        let att_ticks: Vec<u32> = (0..10).filter(|t| att.is_due(*t)).collect();
        let pos_ticks: Vec<u32> = (0..25).filter(|t| pos.is_due(*t)).collect();

        assert_eq!(att_ticks, vec![0, 2, 4, 6, 8]);
        assert_eq!(pos_ticks, vec![0, 10, 20]);
        assert!((0..10).all(|t| every.is_due(t)));
    }

    #[test]
    fn test_invalid_rates() {
        assert_eq!(
            RateGate::new("attitude", 1000, 0),
            Err(StateCtrlError::ZeroRate("attitude"))
        );
        assert_eq!(
            RateGate::new("attitude", 0, 500),
            Err(StateCtrlError::ZeroRate("tick"))
        );
        assert_eq!(
            RateGate::new("position", 100, 500),
            Err(StateCtrlError::FasterThanTick {
                name: "position",
                rate_hz: 500,
                tick_rate_hz: 100
            })
        );
        assert_eq!(
            RateGate::new("position", 1000, 300),
            Err(StateCtrlError::NotADivisor {
                name: "position",
                rate_hz: 300,
                tick_rate_hz: 1000
            })
        );
    }
}
