/*!
 * Polylock
 * Mutex, condition and reader-writer locks behind one operation vocabulary
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{fatal, LockError, LockResult};
pub use crate::core::sync::{
    lock_stats, ConditionGuard, ConditionLock, Exclusive, ExclusiveGuard, ExclusiveLock,
    KindStats, LockHandle, LockStats, MutexKind, ReadGuard, ReadWriteLock, ReaderWriter,
    Waitable, WakeResult, WriteGuard, MUTEX_KIND_ENV,
};
pub use crate::core::types::{LockKind, LockOp};
pub use monitoring::init_tracing;
