// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

pub mod atomic_write;
pub mod diagnostic;
pub mod error;
pub mod result;
pub mod severity;
pub mod subprocess;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use severity::{Enforcement, Severity};

/// A trait that defines the interface of a logger.
pub trait Logger {
    /// Logs a trace message (only with debug enabled).
    fn trace(&self, message: &str);

    /// Logs an info message.
    fn info(&self, message: &str);

    /// Logs a warning message.
    fn warn(&self, message: &str);

    /// Logs an error message.
    fn error(&self, message: &str);

    /// Logs a success message.
    fn success(&self, message: &str);

    /// Mute all the messages except for the warnings and errors.
    fn mute(&self);
}

/// A logger that prints to the console, backed by `paris`.
/// This logger is thread-safe and can be cloned.
#[derive(Default, Clone)]
pub struct ConsoleLogger {
    logger: Arc<Mutex<paris::Logger<'static>>>,
    /// Mute all the messages except for the warnings and errors.
    ///
    /// Ordering logic:
    /// - Acquire on load: ensures a reader sees all preceding writes to the flag.
    /// - Release on store: ensures the store is visible to subsequent acquire loads.
    mute: Arc<AtomicBool>,
}

impl ConsoleLogger {
    /// Creates a new console logger.
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }
}

impl Logger for ConsoleLogger {
    fn trace(&self, message: &str) {
        if !self.mute.load(Ordering::Acquire) {
            _ = self.logger.lock().expect("logger lock poisoned").log(message);
        }
    }

    fn info(&self, message: &str) {
        if self.mute.load(Ordering::Acquire) {
            return;
        }
        _ = self.logger.lock().expect("logger lock poisoned").info(message);
    }

    fn warn(&self, message: &str) {
        _ = self.logger.lock().expect("logger lock poisoned").warn(message);
    }

    fn error(&self, message: &str) {
        _ = self.logger.lock().expect("logger lock poisoned").error(message);
    }

    fn success(&self, message: &str) {
        if self.mute.load(Ordering::Acquire) {
            return;
        }
        _ = self.logger.lock().expect("logger lock poisoned").success(message);
    }

    fn mute(&self) {
        self.mute.store(true, Ordering::Release);
    }
}

/// A logger that does not log anything.
#[derive(Default, Clone)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn trace(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn error(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn mute(&self) {}
}

/// A logger that records counts, for use in unit and integration tests.
#[derive(Default, Clone)]
pub struct TestLogger {
    warn_count: Arc<AtomicUsize>,
    error_count: Arc<AtomicUsize>,
}

impl TestLogger {
    /// Creates a new test logger.
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the number of warning messages logged.
    #[must_use]
    pub fn warn_count(&self) -> usize {
        self.warn_count.load(Ordering::Relaxed)
    }

    /// Returns the number of error messages logged.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }
}

impl Logger for TestLogger {
    fn trace(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn warn(&self, _message: &str) {
        _ = self.warn_count.fetch_add(1, Ordering::Relaxed);
    }
    fn error(&self, _message: &str) {
        _ = self.error_count.fetch_add(1, Ordering::Relaxed);
    }
    fn success(&self, _: &str) {}
    fn mute(&self) {}
}
