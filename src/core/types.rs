/*!
 * Core Types
 * Lock kinds and the operation vocabulary shared by every lock
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete lock variant behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockKind {
    /// Plain mutual exclusion
    Exclusive,
    /// Mutual exclusion plus a bound condition variable
    Condition,
    /// Shared readers or one exclusive writer
    ReadWrite,
}

impl LockKind {
    /// All kinds, in declaration order
    pub const ALL: [LockKind; 3] = [LockKind::Exclusive, LockKind::Condition, LockKind::ReadWrite];

    /// Whether this kind implements `op`
    pub const fn supports(self, op: LockOp) -> bool {
        use LockOp::*;
        match self {
            LockKind::Exclusive => matches!(op, Acquire | Release | Destroy),
            LockKind::Condition => {
                matches!(op, Acquire | Release | Wait | Notify | NotifyAll | Destroy)
            }
            LockKind::ReadWrite => matches!(op, AcquireRead | AcquireWrite | Release | Destroy),
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            LockKind::Exclusive => "exclusive",
            LockKind::Condition => "condition",
            LockKind::ReadWrite => "read_write",
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation vocabulary of the lock interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockOp {
    Acquire,
    Release,
    AcquireRead,
    AcquireWrite,
    Wait,
    Notify,
    NotifyAll,
    Destroy,
}

impl LockOp {
    pub const ALL: [LockOp; 8] = [
        LockOp::Acquire,
        LockOp::Release,
        LockOp::AcquireRead,
        LockOp::AcquireWrite,
        LockOp::Wait,
        LockOp::Notify,
        LockOp::NotifyAll,
        LockOp::Destroy,
    ];

    /// Operations that may suspend the calling thread
    #[inline]
    pub const fn may_block(self) -> bool {
        matches!(
            self,
            LockOp::Acquire | LockOp::AcquireRead | LockOp::AcquireWrite | LockOp::Wait
        )
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            LockOp::Acquire => "acquire",
            LockOp::Release => "release",
            LockOp::AcquireRead => "acquire_read",
            LockOp::AcquireWrite => "acquire_write",
            LockOp::Wait => "wait",
            LockOp::Notify => "notify",
            LockOp::NotifyAll => "notify_all",
            LockOp::Destroy => "destroy",
        }
    }
}

impl fmt::Display for LockOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_supports_release_and_destroy() {
        for kind in LockKind::ALL {
            assert!(kind.supports(LockOp::Release), "{kind} should release");
            assert!(kind.supports(LockOp::Destroy), "{kind} should destroy");
        }
    }

    #[test]
    fn test_capability_table() {
        assert!(!LockKind::Exclusive.supports(LockOp::Wait));
        assert!(!LockKind::Exclusive.supports(LockOp::AcquireRead));
        assert!(LockKind::Condition.supports(LockOp::Acquire));
        assert!(LockKind::Condition.supports(LockOp::NotifyAll));
        assert!(!LockKind::Condition.supports(LockOp::AcquireWrite));
        assert!(!LockKind::ReadWrite.supports(LockOp::Acquire));
        assert!(!LockKind::ReadWrite.supports(LockOp::Notify));
    }

    #[test]
    fn test_blocking_ops() {
        let blocking: Vec<_> = LockOp::ALL.into_iter().filter(|op| op.may_block()).collect();
        assert_eq!(
            blocking,
            vec![LockOp::Acquire, LockOp::AcquireRead, LockOp::AcquireWrite, LockOp::Wait]
        );
    }

    #[test]
    fn test_display_matches_serde_names() {
        assert_eq!(LockKind::ReadWrite.to_string(), "read_write");
        assert_eq!(LockOp::AcquireWrite.to_string(), "acquire_write");
    }
}
