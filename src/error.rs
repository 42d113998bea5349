//! Unified error type.

use std::fmt;

/// The error type returned by tsu-timing's fallible operations.
///
/// Handler failures are never turned into an `Error`: whatever the wrapped
/// handler returns reaches the caller untouched. This type only surfaces
/// configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `TSU_TIMING_ON_FAILURE` was neither `skip` nor `emit`.
    InvalidPolicy(String),
    /// `TSU_TIMING_LEVEL` was not a `tracing` level.
    InvalidLevel(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPolicy(v) => write!(f, "invalid failure policy `{v}` (expected `skip` or `emit`)"),
            Self::InvalidLevel(v)  => write!(f, "invalid log level `{v}`"),
        }
    }
}

impl std::error::Error for Error {}
