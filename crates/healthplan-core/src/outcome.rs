//! Tagged result threaded through every stage that can fall back.
//!
//! A stage backed by the text-generation service either produces its value
//! (`Extracted`), recovers through a deterministic fallback (`FallbackUsed`,
//! carrying the reason so callers can warn that results are approximate), or
//! fails on a fatal error (`Failed`).

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug)]
pub enum Outcome<T> {
    Extracted(T),
    FallbackUsed { value: T, reason: String },
    Failed(Error),
}

impl<T> Outcome<T> {
    pub fn fallback(value: T, reason: impl fmt::Display) -> Self {
        Self::FallbackUsed {
            value,
            reason: reason.to_string(),
        }
    }

    /// Resolve a generated result: `Ok` is kept, a recoverable error runs
    /// `fallback`, a fatal error is surfaced as `Failed`.
    pub fn resolve(result: Result<T>, fallback: impl FnOnce(&Error) -> T) -> Self {
        match result {
            Ok(value) => Self::Extracted(value),
            Err(e) if e.is_recoverable() => {
                let value = fallback(&e);
                Self::fallback(value, e)
            }
            Err(e) => Self::Failed(e),
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, Self::FallbackUsed { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::FallbackUsed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Extracted(value) | Self::FallbackUsed { value, .. } => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Extracted(value) => Outcome::Extracted(f(value)),
            Self::FallbackUsed { value, reason } => Outcome::FallbackUsed {
                value: f(value),
                reason,
            },
            Self::Failed(e) => Outcome::Failed(e),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Extracted(value) | Self::FallbackUsed { value, .. } => Ok(value),
            Self::Failed(e) => Err(e),
        }
    }
}
