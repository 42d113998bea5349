//! Middleware layer.
//!
//! Middleware wraps a handler and is the right place for cross-cutting
//! concerns that should not leak into business logic.
//!
//! Built-in middleware:
//! - [`timing`]: per-request start, end and duration lines tagged with
//!   method and path

pub mod timing;
