//! Tick Source Module
//!
//! All expiry in this crate is measured in host logical ticks, never wall-clock time.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{Result, SizingError};

// == Tick Source ==
/// A monotonically increasing logical tick counter owned by the host.
///
/// Implementations must never go backwards. Consumers read the tick lazily,
/// on each operation, never at construction.
pub trait TickSource: Send + Sync {
    /// Returns the current logical tick.
    fn current_tick(&self) -> i64;
}

// == Tick Clock ==
/// Shared tick counter advanced by the host simulation step.
#[derive(Debug, Default)]
pub struct TickClock {
    tick: AtomicI64,
}

impl TickClock {
    /// Creates a clock starting at tick 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a clock starting at the given tick.
    pub fn starting_at(tick: i64) -> Self {
        Self {
            tick: AtomicI64::new(tick),
        }
    }

    // == Advance To ==
    /// Moves the clock to `tick`.
    ///
    /// Setting the current tick again is allowed; moving backwards is rejected.
    pub fn advance_to(&self, tick: i64) -> Result<()> {
        let current = self.tick.fetch_max(tick, Ordering::AcqRel);
        if tick < current {
            return Err(SizingError::TickRegression {
                current,
                requested: tick,
            });
        }
        Ok(())
    }

    // == Advance By ==
    /// Moves the clock forward by `delta` ticks and returns the new tick.
    pub fn advance_by(&self, delta: u32) -> i64 {
        self.tick.fetch_add(i64::from(delta), Ordering::AcqRel) + i64::from(delta)
    }
}

impl TickSource for TickClock {
    fn current_tick(&self) -> i64 {
        self.tick.load(Ordering::Acquire)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = TickClock::new();
        assert_eq!(clock.current_tick(), 0);
    }

    #[test]
    fn test_advance_to_forward() {
        let clock = TickClock::new();
        clock.advance_to(360).unwrap();
        assert_eq!(clock.current_tick(), 360);

        // Same tick again is fine
        clock.advance_to(360).unwrap();
        assert_eq!(clock.current_tick(), 360);
    }

    #[test]
    fn test_advance_to_rejects_regression() {
        let clock = TickClock::starting_at(100);

        let result = clock.advance_to(99);
        assert!(matches!(
            result,
            Err(SizingError::TickRegression {
                current: 100,
                requested: 99
            })
        ));
        assert_eq!(clock.current_tick(), 100);
    }

    #[test]
    fn test_advance_by() {
        let clock = TickClock::starting_at(10);
        assert_eq!(clock.advance_by(5), 15);
        assert_eq!(clock.current_tick(), 15);
    }
}
