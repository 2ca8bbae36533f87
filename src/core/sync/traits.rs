/*!
 * Lock Capability Traits
 *
 * Each trait names one capability set. Code generic over a capability only
 * compiles against locks that implement it, so asking a plain mutex to
 * wait or a reader-writer lock to notify is a type error, not a no-op.
 *
 * The raw operations mirror a pthread-style API: acquire in one place,
 * release in another. Scoped guards live on the concrete types.
 */

use crate::core::types::LockKind;

/// Result of a notify operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Woke N waiters (N >= 1)
    Woken(usize),
    /// Nobody was waiting; the signal is dropped
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }

    #[inline]
    pub(crate) fn from_count(n: usize) -> Self {
        if n == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(n)
        }
    }
}

/// Mutual exclusion: at most one holder at a time
pub trait Exclusive: Send + Sync {
    /// Block until the calling thread holds the lock
    fn acquire(&self);

    /// Give up a hold taken by [`acquire`](Exclusive::acquire)
    ///
    /// # Safety
    ///
    /// The calling thread must currently hold the lock through a prior
    /// `acquire` that has not been released yet.
    unsafe fn release(&self);

    /// Whether any thread currently holds the lock
    fn is_locked(&self) -> bool;

    fn kind(&self) -> LockKind;
}

/// Condition waiting layered on mutual exclusion
pub trait Waitable: Exclusive {
    /// Atomically release the lock and sleep until notified, then re-acquire
    ///
    /// May return without a matching notify. Callers re-check their
    /// condition in a loop.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock.
    unsafe fn wait(&self);

    /// Wake one thread suspended in [`wait`](Waitable::wait), if any
    ///
    /// May be called with or without the lock held. A waiter that checked
    /// its predicate under the lock is only guaranteed to see the wakeup if
    /// the state change it waits for was made under the lock before this
    /// call; otherwise the signal can land before the waiter parks and is
    /// dropped.
    fn notify(&self) -> WakeResult;

    /// Wake every thread suspended in [`wait`](Waitable::wait)
    fn notify_all(&self) -> WakeResult;
}

/// Many concurrent readers or one exclusive writer
pub trait ReaderWriter: Send + Sync {
    /// Block until the calling thread holds shared read access
    fn acquire_read(&self);

    /// Block until the calling thread holds exclusive write access
    fn acquire_write(&self);

    /// End whichever mode the calling thread holds
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock in read or write mode and the
    /// hold must not have been released yet.
    unsafe fn release(&self);

    /// Whether any reader or writer holds the lock
    fn is_locked(&self) -> bool;

    /// Whether a writer holds the lock
    fn is_locked_write(&self) -> bool;

    fn kind(&self) -> LockKind {
        LockKind::ReadWrite
    }
}
