/*!
 * Structured Tracing
 * Subscriber setup and critical-section spans using the tracing crate
 */

use crate::core::types::LockKind;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Environment variable that switches output to JSON
pub const TRACE_JSON_ENV: &str = "POLYLOCK_TRACE_JSON";

/// Holds longer than this are reported at `warn`
pub const SLOW_HOLD_THRESHOLD: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - POLYLOCK_TRACE_JSON: Enable JSON output (default: false)
///
/// A second call is a no-op; the first installed subscriber stays.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one critical section
///
/// Records how long the section was held when dropped, and warns when it
/// exceeds [`SLOW_HOLD_THRESHOLD`].
pub struct HoldSpan {
    span: tracing::Span,
    start: Instant,
    kind: LockKind,
    label: &'static str,
}

impl HoldSpan {
    pub fn new(kind: LockKind, label: &'static str) -> Self {
        let span = span!(
            Level::DEBUG,
            "critical_section",
            kind = %kind,
            label = label,
            held_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            kind,
            label,
        }
    }

    /// Time held so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for HoldSpan {
    fn drop(&mut self) {
        let held = self.start.elapsed();
        self.span.record("held_us", held.as_micros() as u64);
        let _entered = self.span.enter();

        if held > SLOW_HOLD_THRESHOLD {
            warn!(
                kind = %self.kind,
                label = self.label,
                held_ms = held.as_millis() as u64,
                slow = true,
                "long critical section"
            );
        } else {
            debug!(
                kind = %self.kind,
                label = self.label,
                held_us = held.as_micros() as u64,
                "critical section released"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn test_hold_span_elapsed() {
        let span = HoldSpan::new(LockKind::Exclusive, "test");
        std::thread::sleep(Duration::from_millis(2));
        assert!(span.elapsed() >= Duration::from_millis(2));
    }
}
