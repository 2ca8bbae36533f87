/*!
 * Polylock Demo - Main Entry Point
 *
 * Drives every lock kind through the public API:
 * - Exclusive lock guarding a shared counter
 * - Condition lock hand-off between a producer and a consumer
 * - Reader-writer lock with concurrent readers and one writer
 * - Runtime dispatch through `LockHandle`
 */

use polylock::monitoring::HoldSpan;
use polylock::{
    init_tracing, lock_stats, ConditionLock, ExclusiveLock, LockHandle, LockKind, LockOp,
    MutexKind, ReadWriteLock, Waitable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

const WORKERS: usize = 4;
const ITEMS: usize = 16;

fn run_counter(mutex_kind: MutexKind) -> usize {
    let lock = Arc::new(ExclusiveLock::with_kind(mutex_kind));
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let lock = lock.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..ITEMS {
                    let _guard = lock.lock();
                    let v = counter.load(Ordering::Relaxed);
                    counter.store(v + 1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            warn!("counter worker panicked");
        }
    }

    counter.load(Ordering::Relaxed)
}

fn run_hand_off() -> usize {
    let lock = Arc::new(ConditionLock::new());
    let queued = Arc::new(AtomicUsize::new(0));

    let consumer = {
        let lock = lock.clone();
        let queued = queued.clone();
        thread::spawn(move || {
            let mut consumed = 0;
            while consumed < ITEMS {
                let mut guard = lock.lock();
                guard.wait_while(|| queued.load(Ordering::Relaxed) == 0);
                let _span = HoldSpan::new(LockKind::Condition, "consume");
                consumed += queued.swap(0, Ordering::Relaxed);
            }
            consumed
        })
    };

    for _ in 0..ITEMS {
        let _guard = lock.lock();
        queued.fetch_add(1, Ordering::Relaxed);
        lock.notify();
    }

    consumer.join().unwrap_or(0)
}

fn run_readers_writer() -> usize {
    let lock = Arc::new(ReadWriteLock::new());
    let value = Arc::new(AtomicUsize::new(0));

    let readers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let lock = lock.clone();
            let value = value.clone();
            thread::spawn(move || {
                let _guard = lock.read();
                value.load(Ordering::Relaxed)
            })
        })
        .collect();

    {
        let _guard = lock.write();
        let _span = HoldSpan::new(LockKind::ReadWrite, "publish");
        value.store(ITEMS, Ordering::Relaxed);
    }

    for reader in readers {
        let seen = reader.join().unwrap_or(0);
        info!(seen, "reader finished");
    }

    value.load(Ordering::Relaxed)
}

fn run_dispatch() -> miette::Result<()> {
    for kind in LockKind::ALL {
        let handle = LockHandle::new(kind);
        for op in [LockOp::Acquire, LockOp::AcquireRead, LockOp::Notify] {
            let result = match op {
                LockOp::Acquire => handle.acquire(),
                LockOp::AcquireRead => handle.acquire_read(),
                _ => handle.notify().map(|_| ()),
            };
            match result {
                Ok(()) => {
                    info!(kind = %kind, op = %op, "dispatched");
                    if op != LockOp::Notify {
                        // SAFETY: the operation above just took the hold
                        unsafe { handle.release()? };
                    }
                }
                Err(err) => info!(kind = %kind, op = %op, error = %err, "rejected"),
            }
        }
        handle.destroy();
    }
    Ok(())
}

fn main() -> miette::Result<()> {
    // Initialize structured tracing
    init_tracing();

    info!("Polylock demo starting...");

    let mutex_kind = MutexKind::from_env()?;
    info!(mutex_kind = %mutex_kind, "Running exclusive counter");
    let total = run_counter(mutex_kind);
    info!(total, expected = WORKERS * ITEMS, "Counter finished");

    info!("Running condition hand-off");
    let consumed = run_hand_off();
    info!(consumed, expected = ITEMS, "Hand-off finished");

    info!("Running readers and writer");
    let published = run_readers_writer();
    info!(published, "Readers and writer finished");

    info!("Running handle dispatch");
    run_dispatch()?;

    match serde_json::to_string(&lock_stats()) {
        Ok(json) => info!(stats = %json, "Lock lifecycle stats"),
        Err(e) => warn!(error = %e, "Could not serialize lock stats"),
    }

    info!("Polylock demo finished");
    Ok(())
}
