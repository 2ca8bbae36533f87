/*!
 * Core Module
 * Lock types, errors and the synchronization primitives
 */

pub mod errors;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use types::*;
