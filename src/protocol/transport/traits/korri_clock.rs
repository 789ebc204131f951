//! Monotonic time source abstraction used to timestamp captured frames and
//! to compute transmit deadlines.

/// Microsecond time source. Implementations must be callable from the
/// capture context (interrupt handler), so they must not block.
///
/// Any `Fn() -> u64` is a clock, which covers plain function pointers and
/// closures such as `|| embassy_time::Instant::now().as_micros()`.
pub trait KorriClock {
    /// Current time in microseconds. The counter may wrap; deadline
    /// comparisons are wraparound-safe.
    fn now_us(&self) -> u64;
}

impl<F> KorriClock for F
where
    F: Fn() -> u64,
{
    #[inline]
    fn now_us(&self) -> u64 {
        self()
    }
}
