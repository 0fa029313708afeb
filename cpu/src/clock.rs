//! Simulated elapsed time, derived from the cycles executed.

use std::time::Duration;

use conv::*;

/// Clock is a simulated system clock, advanced by the cycle counts
/// the execution engine reports.  It never waits; converting cycles
/// to time is all it does.
pub trait Clock {
    /// Retrieves the current (simulated) time.
    fn now(&self) -> Duration;

    /// Record that `cycles` CPU cycles have passed.
    ///
    /// # Examples
    ///
    /// ```
    /// use cpu::{Clock, CycleClock};
    ///
    /// fn g<C: Clock>(clk: &mut C) {
    ///   // RETI takes five cycles.
    ///   clk.consume(5);
    /// }
    /// ```
    fn consume(&mut self, cycles: u32);
}

/// A clock running at a fixed frequency.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use cpu::{Clock, CycleClock};
/// let mut clk = CycleClock::new(1_000_000);
/// clk.consume(12);
/// assert_eq!(clk.now(), Duration::from_micros(12));
/// ```
#[derive(Debug)]
pub struct CycleClock {
    frequency_hz: u32,
    cycles: u64,
}

/// The MSP430 runs from its DCO at about 1 MHz after reset.
pub const DEFAULT_FREQUENCY_HZ: u32 = 1_048_576;

impl CycleClock {
    pub fn new(frequency_hz: u32) -> CycleClock {
        CycleClock {
            frequency_hz: frequency_hz.max(1),
            cycles: 0,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Elapsed simulated time in seconds, for reporting.
    pub fn seconds(&self) -> f64 {
        f64::value_from(self.cycles).unwrap_or(f64::MAX)
            / f64::value_from(self.frequency_hz).unwrap_or(f64::MAX)
    }
}

impl Default for CycleClock {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY_HZ)
    }
}

impl Clock for CycleClock {
    fn now(&self) -> Duration {
        let hz = u64::from(self.frequency_hz);
        let whole = self.cycles / hz;
        let remainder = self.cycles % hz;
        let nanos = u128::from(remainder) * 1_000_000_000 / u128::from(hz);
        // remainder < hz, so nanos < 10^9.
        Duration::from_secs(whole) + Duration::from_nanos(nanos as u64)
    }

    fn consume(&mut self, cycles: u32) {
        self.cycles = self.cycles.saturating_add(u64::from(cycles));
    }
}
