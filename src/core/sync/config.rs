/*!
 * Lock Configuration
 *
 * Mutex behavior attribute chosen when an exclusive lock is constructed
 */

use crate::core::errors::{LockError, LockResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted by [`MutexKind::from_env`]
pub const MUTEX_KIND_ENV: &str = "POLYLOCK_MUTEX_KIND";

/// Mutex behavior attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutexKind {
    /// No ownership checks; re-entry deadlocks
    #[default]
    Normal,
    /// Owning thread may re-acquire; one release per acquire
    Recursive,
    /// Re-entry and foreign release are detected and fatal
    ///
    /// Ownership is tracked by a per-thread id that the runtime may hand to
    /// a new thread once the old one exits. A thread that exits while still
    /// holding the mutex therefore abandons it: the hold is never released,
    /// and a thread spawned later can be mistaken for the owner, so its
    /// re-entry or release goes undetected. Release before a thread exits.
    ErrorCheck,
}

impl MutexKind {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            MutexKind::Normal => "normal",
            MutexKind::Recursive => "recursive",
            MutexKind::ErrorCheck => "error_check",
        }
    }

    /// Read the kind from `POLYLOCK_MUTEX_KIND`
    ///
    /// Unset falls back to the default; an unparsable value is an error.
    pub fn from_env() -> LockResult<Self> {
        match std::env::var(MUTEX_KIND_ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl FromStr for MutexKind {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "normal" | "default" => Ok(MutexKind::Normal),
            "recursive" => Ok(MutexKind::Recursive),
            "error_check" | "errorcheck" => Ok(MutexKind::ErrorCheck),
            _ => Err(LockError::InvalidMutexKind(s.to_string())),
        }
    }
}

impl fmt::Display for MutexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_normal() {
        assert_eq!(MutexKind::default(), MutexKind::Normal);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("recursive".parse::<MutexKind>().unwrap(), MutexKind::Recursive);
        assert_eq!(" Error-Check ".parse::<MutexKind>().unwrap(), MutexKind::ErrorCheck);
        assert_eq!("DEFAULT".parse::<MutexKind>().unwrap(), MutexKind::Normal);
    }

    #[test]
    fn test_parse_invalid() {
        let err = "spin".parse::<MutexKind>().unwrap_err();
        assert_eq!(err, LockError::InvalidMutexKind("spin".into()));
    }

    #[test]
    fn test_serde_snake_case() {
        let kind: MutexKind = serde_json::from_str("\"error_check\"").unwrap();
        assert_eq!(kind, MutexKind::ErrorCheck);
        assert_eq!(serde_json::to_string(&MutexKind::Recursive).unwrap(), "\"recursive\"");
    }
}
