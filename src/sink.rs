//! Where timing lines go.
//!
//! The wrapper never writes to a global logger directly. It is handed a
//! [`LogSink`] when it is built and pushes every line through it:
//!
//! | Sink | Use |
//! |---|---|
//! | [`TracingSink`] | default; one `tracing` event per line |
//! | [`MemorySink`] | collects rendered lines, for tests |
//! | any `Fn(&Record<'_>)` | ad-hoc routing (metrics bridge, stdout, …) |

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::Level;

use crate::clock::{Elapsed, Reading};

// ── Record ────────────────────────────────────────────────────────────────────

/// Which of the three lines a [`Record`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Clock reading taken before the handler ran.
    Start(Duration),
    /// Clock reading taken after the handler completed.
    End(Duration),
    /// `End - Start`.
    Duration(Duration),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_)    => "start",
            Self::End(_)      => "end",
            Self::Duration(_) => "duration",
        }
    }
}

/// One timing line for one request.
///
/// `Display` renders the canonical text, e.g.
/// `[GET] /users/42 - Duration: 3.5ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub phase: Phase,
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - ", self.method, self.path)?;
        match self.phase {
            Phase::Start(at)    => write!(f, "Start time: {}", Reading(at)),
            Phase::End(at)      => write!(f, "End time: {}", Reading(at)),
            Phase::Duration(d)  => write!(f, "Duration: {}", Elapsed(d)),
        }
    }
}

// ── LogSink ───────────────────────────────────────────────────────────────────

/// Receives every line the timing wrapper produces, in order.
///
/// Called synchronously from inside the request's future, so it must not
/// block for long.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &Record<'_>);
}

impl<F> LogSink for F
where
    F: Fn(&Record<'_>) + Send + Sync,
{
    fn emit(&self, record: &Record<'_>) {
        self(record)
    }
}

// ── TracingSink ───────────────────────────────────────────────────────────────

/// Emits each line as a `tracing` event with target `tsu_timing`.
///
/// The rendered line is the event message; `method`, `path` and `phase` are
/// attached as fields so structured subscribers can filter on them.
#[derive(Clone, Copy, Debug)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self { Self::new(Level::INFO) }
}

impl LogSink for TracingSink {
    fn emit(&self, record: &Record<'_>) {
        // `tracing` wants the level as a constant per call site.
        macro_rules! event_at {
            ($level:expr) => {
                tracing::event!(
                    target: "tsu_timing",
                    $level,
                    method = record.method,
                    path = record.path,
                    phase = record.phase.name(),
                    "{record}"
                )
            };
        }

        match self.level {
            Level::ERROR => event_at!(Level::ERROR),
            Level::WARN  => event_at!(Level::WARN),
            Level::INFO  => event_at!(Level::INFO),
            Level::DEBUG => event_at!(Level::DEBUG),
            _            => event_at!(Level::TRACE),
        }
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// Keeps every rendered line in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines emitted so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &Record<'_>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phase: Phase) -> String {
        Record { method: "GET", path: "/test", phase }.to_string()
    }

    #[test]
    fn records_render_with_prefix() {
        assert_eq!(record(Phase::Start(Duration::new(1, 500_000_000))), "[GET] /test - Start time: 1s 500ms");
        assert_eq!(record(Phase::End(Duration::new(1, 512_000_000))), "[GET] /test - End time: 1s 512ms");
        assert_eq!(record(Phase::Duration(Duration::from_millis(12))), "[GET] /test - Duration: 12ms");
    }

    #[test]
    fn empty_tag_still_renders() {
        let line = Record { method: "", path: "", phase: Phase::Start(Duration::ZERO) }.to_string();
        assert_eq!(line, "[]  - Start time: 0s 0ms");
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |r: &Record<'_>| seen.lock().unwrap().push(r.phase.name())
        };

        sink.emit(&Record { method: "GET", path: "/", phase: Phase::End(Duration::ZERO) });
        assert_eq!(*seen.lock().unwrap(), ["end"]);
    }

    #[test]
    fn memory_sink_clones_share_lines() {
        let sink = MemorySink::new();
        let other = sink.clone();

        other.emit(&Record { method: "PUT", path: "/a", phase: Phase::Duration(Duration::ZERO) });
        assert_eq!(sink.lines(), ["[PUT] /a - Duration: 0ms"]);
    }
}
