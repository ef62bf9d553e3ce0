use std::time::Instant;

/// microseconds per second, the unit every [`Timestamp`] is counted in
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// A reading from a [`Clock`], in microseconds from some arbitrary origin.
///
/// Readings live in the full `u64` domain and differences are taken modulo
/// that width, so a counter that wraps still produces a sensible (small,
/// non-negative) interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// microseconds elapsed from `earlier` to `self`, wrapping at u64::MAX
    pub fn micros_since(self, earlier: Timestamp) -> u64 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Monotonic process-relative time source. Must never block.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// the real thing: microseconds since this clock was created
#[derive(Debug, Clone, Copy)]
pub struct ProcessClock {
    origin: Instant,
}

impl ProcessClock {
    pub fn new() -> Self {
        ProcessClock {
            origin: Instant::now(),
        }
    }
}

impl Default for ProcessClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ProcessClock {
    fn now(&self) -> Timestamp {
        // truncating the u128 is the wrap; callers only ever look at differences
        Timestamp(self.origin.elapsed().as_micros() as u64)
    }
}

/// Hand-cranked clock for driving the loop in tests and headless runs.
/// Clones share the same counter, so one handle can be given away and the
/// other used to move time forward.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: std::rc::Rc<std::cell::Cell<u64>>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        ManualClock {
            micros: std::rc::Rc::new(std::cell::Cell::new(start)),
        }
    }

    pub fn advance(&self, micros: u64) {
        self.micros.set(self.micros.get().wrapping_add(micros));
    }

    pub fn set(&self, micros: u64) {
        self.micros.set(micros);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.micros.get())
    }
}
