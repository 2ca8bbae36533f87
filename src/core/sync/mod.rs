/*!
 * Synchronization Primitives
 *
 * Three lock kinds behind one vocabulary:
 * - `ExclusiveLock`: mutual exclusion (normal, recursive or error-checking)
 * - `ConditionLock`: exclusive lock with a bound condition variable
 * - `ReadWriteLock`: shared readers or one writer
 *
 * # Architecture
 *
 * Capability traits (`Exclusive`, `Waitable`, `ReaderWriter`) give
 * compile-time dispatch for code that knows its lock kind. `LockHandle`
 * gives runtime dispatch over an owned lock of any kind and reports
 * unsupported operations instead of ignoring them.
 *
 * # Lifecycle
 *
 * Locks are move-only and own their primitive. Teardown runs on drop;
 * `destroy(self)` tears down early. Tearing down a held lock is fatal.
 */

mod condition;
mod config;
mod exclusive;
mod handle;
mod rwlock;
mod stats;
mod traits;

pub use condition::{ConditionGuard, ConditionLock};
pub use config::{MutexKind, MUTEX_KIND_ENV};
pub use exclusive::{ExclusiveGuard, ExclusiveLock};
pub use handle::LockHandle;
pub use rwlock::{ReadGuard, ReadWriteLock, WriteGuard};
pub use stats::{lock_stats, KindStats, LockStats};
pub use traits::{Exclusive, ReaderWriter, WakeResult, Waitable};
