/*!
 * Exclusive Lock
 *
 * Mutual exclusion over parking_lot raw mutexes, with the mutex behavior
 * (normal, recursive, error-checking) picked at construction.
 *
 * # Design: Enum Dispatch Over Raw Primitives
 *
 * The three behaviors share one type so callers configure rather than
 * re-type their locks. Dispatch is a match on a small enum, no vtable.
 */

use super::config::MutexKind;
use super::stats;
use super::traits::Exclusive;
use crate::core::errors::{fatal, LockError};
use crate::core::types::LockKind;
use lock_api::{GetThreadId, RawMutex as _, RawReentrantMutex};
use parking_lot::{RawMutex, RawThreadId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, trace};

/// Owner slot value when nobody holds an error-checking mutex
const NO_OWNER: usize = 0;

/// Address of a thread-local, unique among live threads only. A thread
/// that exits while holding an error-checking mutex leaves its id in the
/// owner slot, and a later thread may be handed the same address.
#[inline]
fn current_thread_id() -> usize {
    RawThreadId::INIT.nonzero_thread_id().get()
}

/// Raw primitive per mutex behavior
enum RawExclusive {
    Normal(RawMutex),
    Recursive(RawReentrantMutex<RawMutex, RawThreadId>),
    ErrorCheck { raw: RawMutex, owner: AtomicUsize },
}

impl RawExclusive {
    fn new(kind: MutexKind) -> Self {
        match kind {
            MutexKind::Normal => Self::Normal(RawMutex::INIT),
            MutexKind::Recursive => Self::Recursive(RawReentrantMutex::INIT),
            MutexKind::ErrorCheck => Self::ErrorCheck {
                raw: RawMutex::INIT,
                owner: AtomicUsize::new(NO_OWNER),
            },
        }
    }

    fn mutex_kind(&self) -> MutexKind {
        match self {
            Self::Normal(_) => MutexKind::Normal,
            Self::Recursive(_) => MutexKind::Recursive,
            Self::ErrorCheck { .. } => MutexKind::ErrorCheck,
        }
    }

    #[inline(always)]
    fn lock(&self) {
        match self {
            Self::Normal(raw) => raw.lock(),
            Self::Recursive(raw) => raw.lock(),
            Self::ErrorCheck { raw, owner } => {
                let me = current_thread_id();
                // Only this thread ever stores `me`, so a relaxed load is exact here
                if owner.load(Ordering::Relaxed) == me {
                    fatal(LockError::AlreadyOwned {
                        kind: LockKind::Exclusive,
                    });
                }
                raw.lock();
                owner.store(me, Ordering::Relaxed);
            }
        }
    }

    #[inline(always)]
    unsafe fn unlock(&self) {
        match self {
            Self::Normal(raw) => {
                debug_assert!(raw.is_locked(), "release of an unheld mutex");
                raw.unlock();
            }
            Self::Recursive(raw) => {
                debug_assert!(
                    raw.is_owned_by_current_thread(),
                    "release of a recursive mutex by a non-owner"
                );
                raw.unlock();
            }
            Self::ErrorCheck { raw, owner } => {
                if owner.load(Ordering::Relaxed) != current_thread_id() {
                    fatal(LockError::NotOwner {
                        kind: LockKind::Exclusive,
                    });
                }
                owner.store(NO_OWNER, Ordering::Relaxed);
                raw.unlock();
            }
        }
    }

    #[inline]
    fn is_locked(&self) -> bool {
        match self {
            Self::Normal(raw) => raw.is_locked(),
            Self::Recursive(raw) => raw.is_locked(),
            Self::ErrorCheck { raw, .. } => raw.is_locked(),
        }
    }
}

/// Report a lock torn down while still held
///
/// Fatal, except during an unrelated unwind where a second panic would abort
/// before the first one is reported.
pub(crate) fn held_at_teardown(kind: LockKind) {
    if std::thread::panicking() {
        error!(kind = %kind, "lock torn down while held during unwind");
    } else {
        fatal(LockError::DestroyedWhileHeld { kind });
    }
}

/// Mutual-exclusion lock
///
/// Move-only: the lock owns its primitive and cannot be cloned. Teardown
/// happens on drop; [`destroy`](ExclusiveLock::destroy) tears down early.
///
/// # Example
///
/// ```
/// use polylock::{Exclusive, ExclusiveLock, MutexKind};
///
/// let lock = ExclusiveLock::with_kind(MutexKind::Recursive);
/// lock.acquire();
/// lock.acquire();
/// unsafe {
///     lock.release();
///     lock.release();
/// }
/// lock.destroy();
/// ```
pub struct ExclusiveLock {
    raw: RawExclusive,
}

impl ExclusiveLock {
    /// Create a normal (non-recursive, unchecked) lock
    pub fn new() -> Self {
        Self::with_kind(MutexKind::Normal)
    }

    /// Create a lock with the given mutex behavior
    pub fn with_kind(kind: MutexKind) -> Self {
        stats::record_created(LockKind::Exclusive);
        trace!(kind = %LockKind::Exclusive, mutex_kind = %kind, "lock initialized");
        Self {
            raw: RawExclusive::new(kind),
        }
    }

    #[inline]
    pub fn mutex_kind(&self) -> MutexKind {
        self.raw.mutex_kind()
    }

    /// Acquire the lock for the lifetime of the returned guard
    #[inline]
    pub fn lock(&self) -> ExclusiveGuard<'_> {
        self.acquire();
        ExclusiveGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Tear the lock down now instead of at end of scope
    pub fn destroy(self) {
        debug!(kind = %LockKind::Exclusive, mutex_kind = %self.mutex_kind(), "lock destroyed");
        drop(self);
    }
}

impl Default for ExclusiveLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Exclusive for ExclusiveLock {
    #[inline]
    fn acquire(&self) {
        self.raw.lock();
    }

    #[inline]
    unsafe fn release(&self) {
        self.raw.unlock();
    }

    #[inline]
    fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    fn kind(&self) -> LockKind {
        LockKind::Exclusive
    }
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        stats::record_destroyed(LockKind::Exclusive);
        trace!(kind = %LockKind::Exclusive, mutex_kind = %self.mutex_kind(), "lock torn down");
        if self.raw.is_locked() {
            held_at_teardown(LockKind::Exclusive);
        }
    }
}

impl fmt::Debug for ExclusiveLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveLock")
            .field("mutex_kind", &self.mutex_kind())
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Scoped hold on an [`ExclusiveLock`]; releases on drop
///
/// Not `Send`: the hold belongs to the thread that took it.
#[must_use = "if unused the lock is released immediately"]
pub struct ExclusiveGuard<'a> {
    lock: &'a ExclusiveLock,
    _not_send: PhantomData<*const ()>,
}

impl ExclusiveGuard<'_> {
    /// The lock this guard holds
    pub fn lock(&self) -> &ExclusiveLock {
        self.lock
    }
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard was created by a successful acquire on this thread
        unsafe { self.lock.release() };
    }
}
