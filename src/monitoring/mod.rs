/*!
 * Monitoring
 * Structured logging setup and critical-section tracing
 */

mod tracer;

pub use tracer::{init_tracing, HoldSpan, SLOW_HOLD_THRESHOLD, TRACE_JSON_ENV};
