//! Per-request timing.
//!
//! Wrap a handler once, at registration time, and every call logs three
//! lines through the configured [`LogSink`]:
//!
//! ```text
//! [GET] /users/42 - Start time: 12s 4.18ms
//! [GET] /users/42 - End time: 12s 7.52ms
//! [GET] /users/42 - Duration: 3.34ms
//! ```
//!
//! The wrapped handler is the same kind of thing as the original: a
//! [`Handler`] stays a `Handler`, a hyper `Service` stays a `Service`. The
//! host registers it exactly as it would have registered the original.
//!
//! ```rust
//! use tsu_timing::{Request, timed};
//!
//! async fn save(req: Request, res: Vec<u8>) -> Result<(), std::io::Error> {
//!     # let _ = (req, res);
//!     Ok(())
//! }
//!
//! let save = timed(save);
//! ```
//!
//! # Failures
//!
//! Whatever the handler returns comes back unchanged, `Err` included. With
//! the default [`OnFailure::Skip`] a failing call logs only its start line.
//! [`OnFailure::Emit`] logs end and duration for failures too, and also when
//! the handler panics or the request future is dropped before it finishes.

use std::future::Future;
use std::sync::Arc;

use hyper::service::Service;

use crate::clock::Clock;
use crate::config::{OnFailure, TimingConfig};
use crate::handler::{BoxFuture, Handler, Outcome};
use crate::request::{RequestDescriptor, Tag};
use crate::sink::{LogSink, Phase, Record, TracingSink};

// ── Timing ────────────────────────────────────────────────────────────────────

/// Builds timed handlers.
///
/// Cheap to clone; every handler wrapped by the same `Timing` (or a clone of
/// it) shares its sink, clock and failure policy. None of those is mutated
/// per request.
#[derive(Clone)]
pub struct Timing {
    sink: Arc<dyn LogSink>,
    clock: Clock,
    on_failure: OnFailure,
}

impl Timing {
    /// Tracing sink at `INFO`, failures skip the end lines.
    pub fn new() -> Self {
        Self::from_config(&TimingConfig::default())
    }

    pub fn from_config(cfg: &TimingConfig) -> Self {
        Self {
            sink: Arc::new(TracingSink::new(cfg.level)),
            clock: Clock::new(),
            on_failure: cfg.on_failure,
        }
    }

    /// Replaces the sink lines are written to.
    pub fn sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn on_failure(mut self, policy: OnFailure) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn wrap<H>(&self, handler: H) -> Timed<H> {
        Timed { inner: handler, timing: self.clone() }
    }

    /// Takes the start reading and emits the start line.
    fn begin(&self, tag: Tag) -> Probe {
        let start = self.clock.now();
        let probe = Probe {
            tag,
            start,
            clock: self.clock,
            sink: Arc::clone(&self.sink),
            on_failure: self.on_failure,
            done: false,
        };
        probe.emit(Phase::Start(start));
        probe
    }
}

impl Default for Timing {
    fn default() -> Self { Self::new() }
}

/// Wraps `handler` with the default [`Timing`].
pub fn timed<H>(handler: H) -> Timed<H> {
    Timing::new().wrap(handler)
}

// ── Probe ─────────────────────────────────────────────────────────────────────

/// One invocation's timing sample. Owned by that invocation's future.
struct Probe {
    tag: Tag,
    start: std::time::Duration,
    clock: Clock,
    sink: Arc<dyn LogSink>,
    on_failure: OnFailure,
    done: bool,
}

impl Probe {
    /// Awaits the handler, then emits the end lines unless the outcome is a
    /// failure the policy says to skip.
    async fn around<F>(mut self, fut: F) -> F::Output
    where
        F: Future,
        F::Output: Outcome,
    {
        // A cancelled request drops this future at the await below and never
        // reaches the lines after it; `Drop` is the only code that runs then.
        let out = fut.await;
        if !out.is_failure() || self.on_failure == OnFailure::Emit {
            self.finish();
        }
        // Handled here, so `Drop` must not log a second time.
        self.done = true;
        out
    }

    fn finish(&mut self) {
        let end = self.clock.now();
        self.emit(Phase::End(end));
        self.emit(Phase::Duration(end.saturating_sub(self.start)));
    }

    fn emit(&self, phase: Phase) {
        self.sink.emit(&Record {
            method: &self.tag.method,
            path: &self.tag.path,
            phase,
        });
    }
}

/// Reached without `done` only on panic or cancellation.
impl Drop for Probe {
    fn drop(&mut self) {
        // Under `Skip` an unfinished call stays silent, same as an `Err`.
        if !self.done && self.on_failure == OnFailure::Emit {
            self.done = true;
            self.finish();
        }
    }
}

// ── Timed ─────────────────────────────────────────────────────────────────────

/// A handler or service wrapped with timing. Created by [`Timing::wrap`] or
/// [`timed`].
#[derive(Clone)]
pub struct Timed<H> {
    inner: H,
    timing: Timing,
}

impl<H> Timed<H> {
    pub fn get_ref(&self) -> &H { &self.inner }

    pub fn into_inner(self) -> H { self.inner }
}

impl<H, Req, Res> Handler<Req, Res> for Timed<H>
where
    H: Handler<Req, Res>,
    H::Output: Outcome,
    Req: RequestDescriptor,
{
    type Output = H::Output;

    fn call(&self, req: Req, res: Res) -> impl Future<Output = Self::Output> + Send {
        // Method and path are copied out before `req` moves into the handler.
        let probe = self.timing.begin(Tag::of(&req));
        probe.around(self.inner.call(req, res))
    }
}

/// hyper's service form: `service_fn(…)` wrapped with [`timed`] can be handed
/// straight to a connection builder.
impl<S, B> Service<http::Request<B>> for Timed<S>
where
    S: Service<http::Request<B>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        // hyper needs a nameable `Future` type that does not borrow `self`,
        // so the start line is logged here and the rest is boxed.
        let probe = self.timing.begin(Tag::of(&req));
        Box::pin(probe.around(self.inner.call(req)))
    }
}
