//! Environment-driven settings.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `TSU_TIMING_ON_FAILURE` | `skip`, `emit` | `skip` |
//! | `TSU_TIMING_LEVEL` | `error`, `warn`, `info`, `debug`, `trace` | `info` |
//!
//! Level names are case-insensitive. `tracing`'s numeric spellings (`1` … `5`)
//! are rejected.
//!
//! Unset variables keep their default. A set-but-invalid variable is an
//! [`Error`], never silently ignored.

use std::fmt;
use std::str::FromStr;

use tracing::Level;

use crate::error::Error;

pub const ON_FAILURE_VAR: &str = "TSU_TIMING_ON_FAILURE";
pub const LEVEL_VAR: &str = "TSU_TIMING_LEVEL";

/// What the wrapper logs when the handler fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OnFailure {
    /// Only the start line is emitted. Failure propagates with no further
    /// output, exactly as if the handler had not been wrapped.
    #[default]
    Skip,
    /// End and duration lines are emitted even on failure, panic or
    /// cancellation.
    Emit,
}

impl OnFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Emit => "emit",
        }
    }
}

/// Case-insensitive: `skip`, `Skip` and `SKIP` are the same policy.
impl FromStr for OnFailure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "emit" => Ok(Self::Emit),
            _      => Err(Error::InvalidPolicy(s.to_owned())),
        }
    }
}

impl fmt::Display for OnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for a [`Timing`](crate::middleware::timing::Timing) built with
/// the default tracing sink.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimingConfig {
    pub on_failure: OnFailure,
    pub level: Level,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { on_failure: OnFailure::Skip, level: Level::INFO }
    }
}

impl TimingConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut cfg = Self::default();

        if let Some(v) = lookup(ON_FAILURE_VAR) {
            cfg.on_failure = v.parse()?;
        }
        if let Some(v) = lookup(LEVEL_VAR) {
            cfg.level = parse_level(&v)?;
        }

        Ok(cfg)
    }
}

/// Named levels only; `Level::from_str` would also take digits.
fn parse_level(v: &str) -> Result<Level, Error> {
    let name = v.trim();
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::InvalidLevel(v.to_owned()));
    }
    name.parse().map_err(|_| Error::InvalidLevel(v.to_owned()))
}
