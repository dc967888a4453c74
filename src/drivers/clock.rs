use std::time::Duration;
/// Sample-count clock. Advances only when a sample is accepted, so plot time
/// is independent of wall-clock jitter in the serial link.
#[derive(Clone, Debug)]
pub struct SyntheticClock {
    ticks: u64,
    quantum_secs: f64,
}
impl SyntheticClock {
    pub fn new(quantum: Duration) -> Self {
        Self {
            ticks: 0,
            quantum_secs: quantum.as_secs_f64(),
        }
    }
    /// Current time in seconds. Derived from the tick count rather than
    /// accumulated, so it stays exact over long runs.
    pub fn now(&self) -> f64 {
        self.ticks as f64 * self.quantum_secs
    }
    pub fn advance(&mut self) {
        self.ticks += 1;
    }
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
