/*!
 * Lock Lifecycle Statistics
 * Process-wide atomic counters of locks created and torn down, per kind
 */

use crate::core::types::LockKind;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic lifecycle counters
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - Relaxed ordering; only touched on init and teardown, never on acquire
#[repr(C, align(64))]
struct AtomicLockStats {
    created: [AtomicU64; 3],
    destroyed: [AtomicU64; 3],
}

static STATS: AtomicLockStats = AtomicLockStats {
    created: [const { AtomicU64::new(0) }; 3],
    destroyed: [const { AtomicU64::new(0) }; 3],
};

#[inline(always)]
const fn slot(kind: LockKind) -> usize {
    match kind {
        LockKind::Exclusive => 0,
        LockKind::Condition => 1,
        LockKind::ReadWrite => 2,
    }
}

#[inline]
pub(crate) fn record_created(kind: LockKind) {
    STATS.created[slot(kind)].fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_destroyed(kind: LockKind) {
    STATS.destroyed[slot(kind)].fetch_add(1, Ordering::Relaxed);
}

/// Counters for one lock kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KindStats {
    pub created: u64,
    pub destroyed: u64,
}

impl KindStats {
    /// Locks of this kind not yet torn down
    #[inline]
    pub fn live(&self) -> u64 {
        self.created.saturating_sub(self.destroyed)
    }
}

/// Snapshot of lifecycle counters
///
/// A condition lock owns an exclusive lock, so it counts once under each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LockStats {
    pub exclusive: KindStats,
    pub condition: KindStats,
    pub read_write: KindStats,
}

impl LockStats {
    pub fn get(&self, kind: LockKind) -> KindStats {
        match kind {
            LockKind::Exclusive => self.exclusive,
            LockKind::Condition => self.condition,
            LockKind::ReadWrite => self.read_write,
        }
    }

    /// Locks of every kind not yet torn down
    pub fn live(&self) -> u64 {
        LockKind::ALL.iter().map(|k| self.get(*k).live()).sum()
    }
}

/// Read current counters
///
/// # Note
/// Values may be mutually inconsistent under concurrent churn, but each
/// counter is exact.
pub fn lock_stats() -> LockStats {
    let kind = |k: LockKind| KindStats {
        created: STATS.created[slot(k)].load(Ordering::Relaxed),
        destroyed: STATS.destroyed[slot(k)].load(Ordering::Relaxed),
    };
    LockStats {
        exclusive: kind(LockKind::Exclusive),
        condition: kind(LockKind::Condition),
        read_write: kind(LockKind::ReadWrite),
    }
}
