/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{LockKind, LockOp};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Result type for fallible lock operations
pub type LockResult<T> = Result<T, LockError>;

/// Lock errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LockError {
    #[error("{kind} lock does not support {op}")]
    #[diagnostic(
        code(lock::unsupported),
        help("Check LockKind::supports before dispatching, or hold the concrete lock type.")
    )]
    Unsupported { kind: LockKind, op: LockOp },

    #[error("Invalid mutex kind: {0}")]
    #[diagnostic(
        code(lock::invalid_mutex_kind),
        help("Use one of: normal, recursive, error_check.")
    )]
    InvalidMutexKind(String),

    #[error("{kind} lock re-acquired by its owning thread")]
    #[diagnostic(
        code(lock::already_owned),
        help("Non-recursive locks deadlock on re-entry. Use MutexKind::Recursive if re-entry is intended.")
    )]
    AlreadyOwned { kind: LockKind },

    #[error("{kind} lock released by a thread that does not hold it")]
    #[diagnostic(
        code(lock::not_owner),
        help("Every release must pair with a prior acquire on the same thread.")
    )]
    NotOwner { kind: LockKind },

    #[error("{kind} lock destroyed while still held")]
    #[diagnostic(
        code(lock::destroyed_while_held),
        help("Release every hold before the lock is destroyed or goes out of scope.")
    )]
    DestroyedWhileHeld { kind: LockKind },
}

impl LockError {
    /// Whether this error is a broken caller contract rather than a dispatch miss
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            LockError::AlreadyOwned { .. }
                | LockError::NotOwner { .. }
                | LockError::DestroyedWhileHeld { .. }
        )
    }
}

/// Report an unrecoverable lock failure and stop the current thread
///
/// A lock that cannot keep its contract leaves no safe continuation, so
/// this never returns. Builds with `panic = "abort"` terminate the process.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fatal(err: LockError) -> ! {
    if err.is_contract_violation() {
        error!(error = %err, contract_violation = true, "lock contract violated");
        panic!("lock contract violated: {}", err);
    }
    error!(error = %err, "fatal lock failure");
    panic!("{}", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = LockError::Unsupported {
            kind: LockKind::Exclusive,
            op: LockOp::Wait,
        };
        assert_eq!(err.to_string(), "exclusive lock does not support wait");
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_contract_violations() {
        assert!(LockError::NotOwner { kind: LockKind::Exclusive }.is_contract_violation());
        assert!(LockError::DestroyedWhileHeld { kind: LockKind::ReadWrite }.is_contract_violation());
        assert!(!LockError::InvalidMutexKind("spin".into()).is_contract_violation());
    }

    #[test]
    fn test_error_serialization() {
        let err = LockError::Unsupported {
            kind: LockKind::ReadWrite,
            op: LockOp::Notify,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"error_type\":\"unsupported\""));
        assert!(json.contains("\"read_write\""));

        let back: LockError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    #[should_panic(expected = "released by a thread that does not hold it")]
    fn test_fatal_panics() {
        fatal(LockError::NotOwner {
            kind: LockKind::Exclusive,
        });
    }

    #[test]
    #[should_panic(expected = "lock contract violated: read_write lock destroyed")]
    fn test_fatal_names_contract_violations() {
        fatal(LockError::DestroyedWhileHeld {
            kind: LockKind::ReadWrite,
        });
    }

    #[test]
    #[should_panic(expected = "Invalid mutex kind: spin")]
    fn test_fatal_other_errors() {
        fatal(LockError::InvalidMutexKind("spin".into()));
    }
}
