//! Diagnostic event sinks.
//!
//! The cache reports what it did ("added", "evicted due to capacity", ...)
//! to an optional [`Logger`]. Sinks are called after the cache lock has been
//! released, and a panicking sink is caught and ignored.

use std::panic::{catch_unwind, AssertUnwindSafe};

/// A sink for cache events. Delivery is best effort.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Prints every event to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("{}", message);
    }
}

/// Forwards every event to `tracing` at INFO level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!(target: "policy_cache::events", "{}", message);
    }
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Deliver `messages` to `sink`, swallowing panics.
pub(crate) fn emit(sink: &dyn Logger, messages: &[String]) {
    for message in messages {
        let delivered = catch_unwind(AssertUnwindSafe(|| sink.log(message)));
        if delivered.is_err() {
            tracing::warn!("cache event sink panicked; event dropped");
        }
    }
}
