/*!
 * Condition Lock
 *
 * An exclusive lock with a condition variable bound to it.
 *
 * # Design
 *
 * The condition variable parks threads on its own address through
 * parking_lot_core. The mutex is released in the `before_sleep` hook,
 * after the waiter is already queued, so a notifier that takes the lock
 * afterwards always finds the waiter.
 *
 * # Notify semantics
 *
 * - `notify` wakes exactly one waiter, `notify_all` wakes every waiter
 * - Signals are never queued: a notify with nobody waiting is dropped
 * - Waiters must tolerate spurious wakeups and re-check their predicate
 */

use super::exclusive::{held_at_teardown, ExclusiveLock};
use super::stats;
use super::traits::{Exclusive, WakeResult, Waitable};
use crate::core::types::LockKind;
use parking_lot_core::{park, unpark_all, unpark_one, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Condition variable parked on its own address
struct Condvar {
    waiters: AtomicUsize,
}

impl Condvar {
    const fn new() -> Self {
        Self {
            waiters: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn key(&self) -> usize {
        &self.waiters as *const AtomicUsize as usize
    }

    /// Caller holds `mutex`; returns holding it again
    unsafe fn wait(&self, mutex: &ExclusiveLock) {
        // Counted while the mutex is still held, so a notifier holding the
        // mutex sees this waiter.
        self.waiters.fetch_add(1, Ordering::Relaxed);

        // SAFETY: the key is this condvar's address, unique while it lives;
        // the caller holds `mutex`, which is released once we are queued.
        unsafe {
            park(
                self.key(),
                || true,
                || mutex.release(),
                |_key, _was_last| {},
                DEFAULT_PARK_TOKEN,
                None,
            );
        }

        self.waiters.fetch_sub(1, Ordering::Relaxed);
        mutex.acquire();
    }

    // No fast path on `waiters`: the parking lot's queue is the only
    // authority on who is parked, for notifiers with or without the mutex.
    fn notify_one(&self) -> WakeResult {
        let result = unsafe { unpark_one(self.key(), |_| DEFAULT_UNPARK_TOKEN) };
        WakeResult::from_count(result.unparked_threads)
    }

    fn notify_all(&self) -> WakeResult {
        let unparked = unsafe { unpark_all(self.key(), DEFAULT_UNPARK_TOKEN) };
        WakeResult::from_count(unparked)
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        debug_assert_eq!(
            self.waiters.load(Ordering::Relaxed),
            0,
            "condition variable torn down with waiters"
        );
    }
}

/// Exclusive lock plus a bound condition variable
///
/// Move-only like [`ExclusiveLock`]. Teardown drops the condition variable
/// before the mutex it is bound to; `wait` borrows the lock, so teardown
/// can never overlap a waiting thread.
pub struct ConditionLock {
    // Field order is teardown order: condition variable first, then mutex.
    cond: Condvar,
    lock: ExclusiveLock,
}

impl ConditionLock {
    pub fn new() -> Self {
        stats::record_created(LockKind::Condition);
        trace!(kind = %LockKind::Condition, "lock initialized");
        Self {
            cond: Condvar::new(),
            lock: ExclusiveLock::new(),
        }
    }

    /// Acquire the lock for the lifetime of the returned guard
    #[inline]
    pub fn lock(&self) -> ConditionGuard<'_> {
        self.acquire();
        ConditionGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Threads currently inside `wait` (diagnostics only)
    pub fn waiter_count(&self) -> usize {
        self.cond.waiters.load(Ordering::Relaxed)
    }

    /// Tear the lock down now instead of at end of scope
    pub fn destroy(self) {
        debug!(kind = %LockKind::Condition, "lock destroyed");
        drop(self);
    }
}

impl Default for ConditionLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Exclusive for ConditionLock {
    #[inline]
    fn acquire(&self) {
        self.lock.acquire();
    }

    #[inline]
    unsafe fn release(&self) {
        self.lock.release();
    }

    #[inline]
    fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    fn kind(&self) -> LockKind {
        LockKind::Condition
    }
}

impl Waitable for ConditionLock {
    unsafe fn wait(&self) {
        debug_assert!(self.lock.is_locked(), "wait without holding the lock");
        self.cond.wait(&self.lock);
    }

    #[inline]
    fn notify(&self) -> WakeResult {
        self.cond.notify_one()
    }

    #[inline]
    fn notify_all(&self) -> WakeResult {
        self.cond.notify_all()
    }
}

impl Drop for ConditionLock {
    fn drop(&mut self) {
        stats::record_destroyed(LockKind::Condition);
        trace!(kind = %LockKind::Condition, "lock torn down");
        if self.lock.is_locked() {
            held_at_teardown(LockKind::Condition);
        }
    }
}

impl fmt::Debug for ConditionLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionLock")
            .field("locked", &self.is_locked())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}

/// Scoped hold on a [`ConditionLock`]; releases on drop
#[must_use = "if unused the lock is released immediately"]
pub struct ConditionGuard<'a> {
    lock: &'a ConditionLock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ConditionGuard<'a> {
    /// Release, sleep until notified, re-acquire
    ///
    /// May wake spuriously; prefer [`wait_while`](Self::wait_while).
    pub fn wait(&mut self) {
        // SAFETY: the guard proves this thread holds the lock
        unsafe { self.lock.wait() };
    }

    /// Wait until `condition` returns false
    ///
    /// The condition is checked before the first wait and after every
    /// wakeup, always with the lock held.
    pub fn wait_while<F>(&mut self, mut condition: F)
    where
        F: FnMut() -> bool,
    {
        while condition() {
            self.wait();
        }
    }

    /// The lock this guard holds
    pub fn lock(&self) -> &'a ConditionLock {
        self.lock
    }
}

impl Drop for ConditionGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard was created by a successful acquire on this thread
        unsafe { self.lock.release() };
    }
}
