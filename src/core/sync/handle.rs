/*!
 * Lock Handle
 *
 * One owned value over any of the three lock kinds, exposing the whole
 * operation vocabulary. Callers that only learn the kind at runtime (for
 * instance from configuration) hold a `LockHandle` and dispatch through it.
 *
 * # Design: Enum Dispatch With Reported Misses
 *
 * An operation the held kind does not implement completes immediately,
 * leaves the lock untouched and returns `LockError::Unsupported`. It is
 * never silently accepted. Code that knows its kind at compile time should
 * use the capability traits instead.
 */

use super::condition::ConditionLock;
use super::config::MutexKind;
use super::exclusive::ExclusiveLock;
use super::rwlock::ReadWriteLock;
use super::traits::{Exclusive, ReaderWriter, Waitable, WakeResult};
use crate::core::errors::{LockError, LockResult};
use crate::core::types::{LockKind, LockOp};

/// Owned lock of any kind
#[derive(Debug)]
pub enum LockHandle {
    Exclusive(ExclusiveLock),
    Condition(ConditionLock),
    ReadWrite(ReadWriteLock),
}

impl LockHandle {
    /// Create a handle of the given kind with default configuration
    pub fn new(kind: LockKind) -> Self {
        match kind {
            LockKind::Exclusive => Self::Exclusive(ExclusiveLock::new()),
            LockKind::Condition => Self::Condition(ConditionLock::new()),
            LockKind::ReadWrite => Self::ReadWrite(ReadWriteLock::new()),
        }
    }

    /// Create an exclusive-lock handle with the given mutex behavior
    pub fn exclusive(mutex_kind: MutexKind) -> Self {
        Self::Exclusive(ExclusiveLock::with_kind(mutex_kind))
    }

    #[inline]
    pub fn kind(&self) -> LockKind {
        match self {
            Self::Exclusive(_) => LockKind::Exclusive,
            Self::Condition(_) => LockKind::Condition,
            Self::ReadWrite(_) => LockKind::ReadWrite,
        }
    }

    #[inline]
    pub fn supports(&self, op: LockOp) -> bool {
        self.kind().supports(op)
    }

    #[inline]
    fn unsupported(&self, op: LockOp) -> LockError {
        LockError::Unsupported {
            kind: self.kind(),
            op,
        }
    }

    /// Block until exclusively held
    pub fn acquire(&self) -> LockResult<()> {
        match self {
            Self::Exclusive(lock) => lock.acquire(),
            Self::Condition(lock) => lock.acquire(),
            Self::ReadWrite(_) => return Err(self.unsupported(LockOp::Acquire)),
        }
        Ok(())
    }

    /// End the current hold, whatever its mode
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock through a prior acquire,
    /// acquire_read or acquire_write that has not been released yet.
    pub unsafe fn release(&self) -> LockResult<()> {
        match self {
            Self::Exclusive(lock) => Exclusive::release(lock),
            Self::Condition(lock) => Exclusive::release(lock),
            Self::ReadWrite(lock) => ReaderWriter::release(lock),
        }
        Ok(())
    }

    /// Block until shared read access is held
    pub fn acquire_read(&self) -> LockResult<()> {
        match self {
            Self::ReadWrite(lock) => {
                lock.acquire_read();
                Ok(())
            }
            _ => Err(self.unsupported(LockOp::AcquireRead)),
        }
    }

    /// Block until exclusive write access is held
    pub fn acquire_write(&self) -> LockResult<()> {
        match self {
            Self::ReadWrite(lock) => {
                lock.acquire_write();
                Ok(())
            }
            _ => Err(self.unsupported(LockOp::AcquireWrite)),
        }
    }

    /// Release, sleep until notified, re-acquire
    ///
    /// # Safety
    ///
    /// On a condition lock the calling thread must hold the lock. Other
    /// kinds return `Unsupported` without touching the lock.
    pub unsafe fn wait(&self) -> LockResult<()> {
        match self {
            Self::Condition(lock) => {
                lock.wait();
                Ok(())
            }
            _ => Err(self.unsupported(LockOp::Wait)),
        }
    }

    /// Wake one waiter
    pub fn notify(&self) -> LockResult<WakeResult> {
        match self {
            Self::Condition(lock) => Ok(lock.notify()),
            _ => Err(self.unsupported(LockOp::Notify)),
        }
    }

    /// Wake every waiter
    pub fn notify_all(&self) -> LockResult<WakeResult> {
        match self {
            Self::Condition(lock) => Ok(lock.notify_all()),
            _ => Err(self.unsupported(LockOp::NotifyAll)),
        }
    }

    /// Whether any thread holds the lock in any mode
    pub fn is_locked(&self) -> bool {
        match self {
            Self::Exclusive(lock) => lock.is_locked(),
            Self::Condition(lock) => lock.is_locked(),
            Self::ReadWrite(lock) => ReaderWriter::is_locked(lock),
        }
    }

    /// Tear the lock down now instead of at end of scope
    pub fn destroy(self) {
        match self {
            Self::Exclusive(lock) => lock.destroy(),
            Self::Condition(lock) => lock.destroy(),
            Self::ReadWrite(lock) => lock.destroy(),
        }
    }

    pub fn as_exclusive(&self) -> Option<&ExclusiveLock> {
        match self {
            Self::Exclusive(lock) => Some(lock),
            _ => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionLock> {
        match self {
            Self::Condition(lock) => Some(lock),
            _ => None,
        }
    }

    pub fn as_read_write(&self) -> Option<&ReadWriteLock> {
        match self {
            Self::ReadWrite(lock) => Some(lock),
            _ => None,
        }
    }
}

impl From<ExclusiveLock> for LockHandle {
    fn from(lock: ExclusiveLock) -> Self {
        Self::Exclusive(lock)
    }
}

impl From<ConditionLock> for LockHandle {
    fn from(lock: ConditionLock) -> Self {
        Self::Condition(lock)
    }
}

impl From<ReadWriteLock> for LockHandle {
    fn from(lock: ReadWriteLock) -> Self {
        Self::ReadWrite(lock)
    }
}
