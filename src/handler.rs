//! Handler trait and type erasure.
//!
//! # What a handler is
//!
//! A handler takes a request descriptor and a response descriptor **by
//! value**, does asynchronous work, and resolves to some output. The output
//! is usually `()` or `Result<(), E>`; the timing wrapper only needs to know
//! whether it counts as a failure, which is what [`Outcome`] answers.
//!
//! Plain functions and closures are handlers through the blanket impl.
//! Structs may implement [`Handler`] themselves when the handler needs its
//! own state; a wrapped struct is still called through its own `&self`.
//!
//! # How handlers are stored
//!
//! A host that keeps many handlers in one table needs them behind a single
//! type. [`Handler::boxed`] erases any handler, wrapped or not, into a
//! [`BoxedHandler`]:
//!
//! ```text
//! async fn save(req, res) -> Result<(), E> { … }   ← user writes this
//!        ↓ timed(save)
//! Timed<fn item>                                   ← still a Handler
//!        ↓ .boxed()
//! Arc<dyn ErasedHandler<Req, Res, Result<(), E>>>  ← stored by the host
//!        ↓
//! handler.call(req, res)  at request time          ← one vtable dispatch
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Classifies a handler's output as success or failure.
///
/// [`Timed`](crate::Timed) only wraps handlers whose output implements this
/// trait. Implemented for `()`, `Result<T, E>` and `http::Response<B>`;
/// implement it on your own response type to time handlers returning it.
pub trait Outcome {
    fn is_failure(&self) -> bool;
}

/// Side-effect-only handlers never fail through their return value.
impl Outcome for () {
    fn is_failure(&self) -> bool { false }
}

impl<T, E> Outcome for Result<T, E> {
    fn is_failure(&self) -> bool { self.is_err() }
}

/// A response is a value the handler produced, whatever its status. Only an
/// `Err` counts as a failure.
impl<B> Outcome for http::Response<B> {
    fn is_failure(&self) -> bool { false }
}

// ── Handler ───────────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future borrowing from `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An asynchronous request handler taking `(Req, Res)`.
///
/// Automatically implemented for every
///
/// ```text
/// Fn(Req, Res) -> impl Future + Send
/// ```
pub trait Handler<Req, Res>: Send + Sync + 'static {
    type Output;

    fn call(&self, req: Req, res: Res) -> impl Future<Output = Self::Output> + Send;

    /// Erases the handler's concrete type so it can share a table with
    /// handlers of other types.
    fn boxed(self) -> BoxedHandler<Req, Res, Self::Output>
    where
        Self: Sized,
        Req: Send + 'static,
        Res: Send + 'static,
    {
        Arc::new(self)
    }
}

impl<F, Fut, Req, Res> Handler<Req, Res> for F
where
    F: Fn(Req, Res) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
{
    type Output = Fut::Output;

    fn call(&self, req: Req, res: Res) -> impl Future<Output = Self::Output> + Send {
        self(req, res)
    }
}

// ── Type erasure ──────────────────────────────────────────────────────────────

/// Object-safe mirror of [`Handler`].
///
/// `Handler::call` returns `impl Future`, which a trait object cannot name;
/// this trait boxes the future instead. Blanket-implemented for every
/// handler.
pub trait ErasedHandler<Req, Res, O>: Send + Sync {
    fn call(&self, req: Req, res: Res) -> BoxFuture<'_, O>;
}

impl<H, Req, Res> ErasedHandler<Req, Res, H::Output> for H
where
    H: Handler<Req, Res>,
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn call(&self, req: Req, res: Res) -> BoxFuture<'_, H::Output> {
        Box::pin(Handler::call(self, req, res))
    }
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler<Req, Res, O = ()> = Arc<dyn ErasedHandler<Req, Res, O> + Send + Sync + 'static>;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn outcome_classifies_results() {
        assert!(!().is_failure());
        assert!(!Ok::<u8, ()>(1).is_failure());
        assert!(Err::<u8, &str>("nope").is_failure());

        let mut res = http::Response::new(());
        *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
        assert!(!res.is_failure());
    }

    #[tokio::test]
    async fn closures_are_handlers() {
        let h = |req: u32, res: u32| async move { req + res };
        assert_eq!(Handler::call(&h, 2, 3).await, 5);
    }

    struct Counter(AtomicUsize);

    impl Handler<(), ()> for Counter {
        type Output = usize;

        async fn call(&self, _req: (), _res: ()) -> usize {
            self.0.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    #[tokio::test]
    async fn boxed_handlers_keep_their_state() {
        let boxed: BoxedHandler<(), (), usize> = Counter(AtomicUsize::new(0)).boxed();
        assert_eq!(boxed.call((), ()).await, 1);
        assert_eq!(boxed.call((), ()).await, 2);
    }
}
