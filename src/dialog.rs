use std::time::Duration;

/// A span of media time. Dialog intervals come straight from subtitle cues,
/// condense intervals are derived from them by the condenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub(crate) start: Duration,
    pub(crate) end: Duration,
}

impl Interval {
    pub fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// A single subtitle cue: its timing and the text shown during it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub(crate) interval: Interval,
    pub(crate) text: String,
}
