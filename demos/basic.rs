//! Minimal tsu-timing example: a hyper server whose service is timed.
//!
//! Run with:
//!   cargo run --example basic
//!   TSU_TIMING_LEVEL=warn TSU_TIMING_ON_FAILURE=emit cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/slow
//!
//! Every request logs three lines:
//!   INFO tsu_timing: [GET] /slow - Start time: 3s 12.4ms …
//!   INFO tsu_timing: [GET] /slow - End time: 3s 263.9ms …
//!   INFO tsu_timing: [GET] /slow - Duration: 251.5ms …

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tsu_timing::{Timing, TimingConfig};

type Body = Full<Bytes>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let timing = Timing::from_config(&TimingConfig::from_env()?);
    // One wrapped service, shared by every connection.
    let svc = Arc::new(timing.wrap(service_fn(handle)));

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(addr = %listener.local_addr()?, "listening");

    // Tracks every connection task so shutdown can wait for them.
    let mut tasks = tokio::task::JoinSet::new();

    // `select!` polls the same shutdown future on every iteration, so it has
    // to stay put in memory.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Check shutdown first so a SIGTERM stops accepting right away,
            // even while connections are still queued.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let svc = Arc::clone(&svc);
                tasks.spawn(async move {
                    // `TokioIo` adapts tokio's streams to hyper's IO traits;
                    // `auto::Builder` speaks HTTP/1.1 or HTTP/2, whichever
                    // the client negotiates.
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        error!(%peer, "connection error: {e}");
                    }
                });
            }

            // Reap finished connections so the set does not grow forever.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    // Drain: every in-flight request finishes, and logs its timing, first.
    while tasks.join_next().await.is_some() {}

    info!("stopped");
    Ok(())
}

async fn handle(
    req: http::Request<hyper::body::Incoming>,
) -> Result<http::Response<Body>, Infallible> {
    let res = match req.uri().path() {
        "/slow" => {
            tokio::time::sleep(Duration::from_millis(250)).await;
            http::Response::new(Body::from("finally"))
        }
        path if path.starts_with("/users/") => {
            let id = &path["/users/".len()..];
            http::Response::new(Body::from(format!(r#"{{"id":"{id}","name":"alice"}}"#)))
        }
        _ => {
            let mut res = http::Response::new(Body::default());
            *res.status_mut() = http::StatusCode::NOT_FOUND;
            res
        }
    };
    Ok(res)
}

/// Resolves on SIGTERM or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
