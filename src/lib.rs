//! # tsu-timing
//!
//! Per-request timing for async handlers. Wrap a handler, register the
//! result where the original would have gone, and every call logs when it
//! started, when it ended and how long it took.
//!
//! ## The contract
//!
//! The wrapper measures and logs. Nothing more:
//!
//! - The inner handler runs exactly once, with the arguments it was given.
//! - Its output, `Err` included, comes back untouched.
//! - Lines go to an injected [`LogSink`]; the default is `tracing`.
//!
//! Routing, request parsing, response building and metric aggregation
//! belong to the host framework.
//!
//! ## Quick start
//!
//! ```rust
//! use tsu_timing::{Handler, MemorySink, Request, Timing};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! async fn get_user(req: Request, _res: ()) {
//!     let _ = req.header("x-request-id");
//! }
//!
//! let lines = MemorySink::new();
//! let handler = Timing::new().sink(lines.clone()).wrap(get_user);
//!
//! handler.call(Request::new("GET", "/users/42"), ()).await;
//!
//! assert!(lines.lines()[0].starts_with("[GET] /users/42 - Start time: "));
//! assert!(lines.lines()[2].starts_with("[GET] /users/42 - Duration: "));
//! # }
//! ```
//!
//! With hyper, wrap the service:
//!
//! ```rust,ignore
//! let svc = tsu_timing::timed(hyper::service::service_fn(handle));
//! ConnBuilder::new(TokioExecutor::new()).serve_connection(io, svc).await?;
//! ```
//!
//! ## Configuration
//!
//! [`TimingConfig::from_env`] reads `TSU_TIMING_ON_FAILURE` and
//! `TSU_TIMING_LEVEL`; see [`config`].

pub mod clock;
pub mod config;
mod error;
mod handler;
mod request;
pub mod sink;

pub mod middleware;

pub use config::{OnFailure, TimingConfig};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Outcome};
pub use middleware::timing::{Timed, Timing, timed};
pub use request::{Request, RequestDescriptor};
pub use sink::{LogSink, MemorySink, Record, TracingSink};
