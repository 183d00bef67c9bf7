use std::fmt;

/// Stage of the pipeline a [`ProgressEvent`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Trimming,
    Converting,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Trimming => "Trimming",
            Phase::Converting => "Converting",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Best-effort progress observation.
///
/// Events are emitted at suspension points only, so consumers see a sample of
/// percentages rather than every value. The last event of a completed phase
/// always carries `percent == 100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub percent: u8,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}... {}%", self.phase, self.percent)
    }
}

/// Receiver of [`ProgressEvent`]s.
///
/// Closures taking a `ProgressEvent` implement this trait, so
/// `|event| tx.send(event)` style forwarding into a channel works directly.
pub trait ProgressReporter {
    fn report(&mut self, _event: ProgressEvent) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(ProgressEvent),
{
    fn report(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Reporter that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
