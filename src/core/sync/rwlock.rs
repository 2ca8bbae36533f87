/*!
 * Reader-Writer Lock
 *
 * Many concurrent readers or one writer, over `parking_lot::RawRwLock`.
 * Wake order and writer priority are parking_lot's: readers queue behind
 * a waiting writer, so writers do not starve.
 */

use super::exclusive::held_at_teardown;
use super::stats;
use super::traits::ReaderWriter;
use crate::core::types::LockKind;
use lock_api::RawRwLock as _;
use parking_lot::RawRwLock;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Reader-writer lock
///
/// `release` ends whichever mode the caller holds. The lock keeps no
/// record of who holds it in which mode, only whether a writer is inside,
/// which under correct use can only be the caller.
pub struct ReadWriteLock {
    raw: RawRwLock,
    // Set by the writer once inside, cleared before it leaves. The raw
    // writer bit cannot be used: it is also set while a writer is queued.
    writer: AtomicBool,
}

impl ReadWriteLock {
    pub fn new() -> Self {
        stats::record_created(LockKind::ReadWrite);
        trace!(kind = %LockKind::ReadWrite, "lock initialized");
        Self {
            raw: RawRwLock::INIT,
            writer: AtomicBool::new(false),
        }
    }

    /// Acquire shared access for the lifetime of the returned guard
    #[inline]
    pub fn read(&self) -> ReadGuard<'_> {
        self.raw.lock_shared();
        ReadGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Acquire exclusive access for the lifetime of the returned guard
    #[inline]
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Tear the lock down now instead of at end of scope
    pub fn destroy(self) {
        debug!(kind = %LockKind::ReadWrite, "lock destroyed");
        drop(self);
    }
}

impl Default for ReadWriteLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderWriter for ReadWriteLock {
    #[inline]
    fn acquire_read(&self) {
        self.raw.lock_shared();
    }

    #[inline]
    fn acquire_write(&self) {
        self.raw.lock_exclusive();
        self.writer.store(true, Ordering::Relaxed);
    }

    #[inline]
    unsafe fn release(&self) {
        debug_assert!(self.raw.is_locked(), "release of an unheld rwlock");
        // Only the writer inside ever sees its own flag set; the lock orders
        // its clear before any later hold.
        if self.writer.load(Ordering::Relaxed) {
            self.writer.store(false, Ordering::Relaxed);
            self.raw.unlock_exclusive();
        } else {
            self.raw.unlock_shared();
        }
    }

    #[inline]
    fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    #[inline]
    fn is_locked_write(&self) -> bool {
        self.writer.load(Ordering::Relaxed)
    }
}

impl Drop for ReadWriteLock {
    fn drop(&mut self) {
        stats::record_destroyed(LockKind::ReadWrite);
        trace!(kind = %LockKind::ReadWrite, "lock torn down");
        if self.raw.is_locked() {
            held_at_teardown(LockKind::ReadWrite);
        }
    }
}

impl fmt::Debug for ReadWriteLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadWriteLock")
            .field("locked", &self.is_locked())
            .field("write_locked", &self.is_locked_write())
            .finish()
    }
}

/// Scoped shared hold; releases on drop
#[must_use = "if unused the lock is released immediately"]
pub struct ReadGuard<'a> {
    lock: &'a ReadWriteLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard was created by a successful lock_shared
        unsafe { self.lock.raw.unlock_shared() };
    }
}

/// Scoped exclusive hold; releases on drop
#[must_use = "if unused the lock is released immediately"]
pub struct WriteGuard<'a> {
    lock: &'a ReadWriteLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.writer.store(false, Ordering::Relaxed);
        // SAFETY: the guard was created by a successful lock_exclusive
        unsafe { self.lock.raw.unlock_exclusive() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Poll `condition` until it holds or `timeout` passes
    fn wait_until<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !condition() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    #[test]
    fn test_release_ends_read_mode() {
        let lock = ReadWriteLock::new();
        lock.acquire_read();
        lock.acquire_read();
        assert!(lock.is_locked());
        assert!(!lock.is_locked_write());

        unsafe { lock.release() };
        assert!(lock.is_locked(), "one reader still inside");
        unsafe { lock.release() };
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_release_ends_write_mode() {
        let lock = ReadWriteLock::new();
        lock.acquire_write();
        assert!(lock.is_locked_write());
        unsafe { lock.release() };
        assert!(!lock.is_locked());

        // Usable in read mode afterwards
        lock.acquire_read();
        unsafe { lock.release() };
        lock.destroy();
    }

    #[test]
    fn test_readers_overlap() {
        const READERS: usize = 4;
        let lock = Arc::new(ReadWriteLock::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let all_in = Arc::new(Barrier::new(READERS));

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let lock = lock.clone();
                let inside = inside.clone();
                let all_in = all_in.clone();
                thread::spawn(move || {
                    let _guard = lock.read();
                    inside.fetch_add(1, Ordering::SeqCst);
                    // Every reader reaches the barrier while holding read access
                    all_in.wait();
                    inside.load(Ordering::SeqCst)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), READERS);
        }
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let lock = Arc::new(ReadWriteLock::new());
        let writer_in = Arc::new(AtomicBool::new(false));

        let reader = lock.read();

        let writer = {
            let lock = lock.clone();
            let writer_in = writer_in.clone();
            thread::spawn(move || {
                let _guard = lock.write();
                writer_in.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!writer_in.load(Ordering::SeqCst), "writer entered past a reader");

        drop(reader);
        writer.join().unwrap();
        assert!(writer_in.load(Ordering::SeqCst));
    }

    #[test]
    fn test_reader_release_with_writer_queued() {
        let lock = Arc::new(ReadWriteLock::new());
        let writer_in = Arc::new(AtomicBool::new(false));
        let writer_go = Arc::new(AtomicBool::new(false));
        let reader_in = Arc::new(AtomicBool::new(false));

        lock.acquire_read();

        let writer = {
            let lock = lock.clone();
            let writer_in = writer_in.clone();
            let writer_go = writer_go.clone();
            thread::spawn(move || {
                lock.acquire_write();
                writer_in.store(true, Ordering::SeqCst);
                while !writer_go.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(1));
                }
                unsafe { lock.release() };
            })
        };

        // Queued writer: the primitive already reports it, but it is not inside
        assert!(wait_until(|| lock.raw.is_locked_exclusive(), Duration::from_secs(5)));
        assert!(!writer_in.load(Ordering::SeqCst));
        assert!(!lock.is_locked_write());

        // Ends the shared hold, letting the writer in
        unsafe { lock.release() };
        assert!(
            wait_until(|| writer_in.load(Ordering::SeqCst), Duration::from_secs(5)),
            "writer never got in after the reader left"
        );
        assert!(lock.is_locked_write());

        let reader = {
            let lock = lock.clone();
            let reader_in = reader_in.clone();
            thread::spawn(move || {
                lock.acquire_read();
                reader_in.store(true, Ordering::SeqCst);
                unsafe { lock.release() };
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!reader_in.load(Ordering::SeqCst), "reader entered while writer holds");

        writer_go.store(true, Ordering::SeqCst);
        writer.join().unwrap();
        reader.join().unwrap();
        assert!(reader_in.load(Ordering::SeqCst));
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_write_guard_clears_writer() {
        let lock = ReadWriteLock::new();
        {
            let _guard = lock.write();
            assert!(lock.is_locked_write());
        }
        assert!(!lock.is_locked_write());

        // Raw release after a guard hold picks shared mode
        lock.acquire_read();
        unsafe { lock.release() };
        assert!(!lock.is_locked());
    }

    #[test]
    #[should_panic(expected = "destroyed while still held")]
    fn test_destroy_while_read_held_is_fatal() {
        let lock = ReadWriteLock::new();
        lock.acquire_read();
        drop(lock);
    }
}
