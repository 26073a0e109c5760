/// Virtual time for the discrete-event kernel.
///
/// A tick counter with no connection to `std::time`. The clock only moves
/// when the kernel dispatches an event.

/// A point in simulated time, measured in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VirtualTime(u64);

impl VirtualTime {
    /// The start of every run.
    pub const ZERO: VirtualTime = VirtualTime(0);

    /// Create a `VirtualTime` from a raw tick value.
    #[inline]
    pub fn new(ticks: u64) -> Self {
        VirtualTime(ticks)
    }

    /// Return the raw tick value.
    #[inline]
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// The time `delay` ticks after `self`, or `None` on overflow.
    #[inline]
    pub fn plus(self, delay: u64) -> Option<VirtualTime> {
        self.0.checked_add(delay).map(VirtualTime)
    }

    /// Like [`plus`](Self::plus) but pins at `u64::MAX` instead of failing.
    ///
    /// Used for arrival times: an event at the end of time never fires
    /// before any finite `end_time`, which is the behavior we want.
    #[inline]
    pub fn saturating_plus(self, delay: u64) -> VirtualTime {
        VirtualTime(self.0.saturating_add(delay))
    }
}

impl std::fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={}", self.0)
    }
}

impl From<u64> for VirtualTime {
    fn from(ticks: u64) -> Self {
        VirtualTime(ticks)
    }
}
