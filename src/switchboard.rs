// src/switchboard.rs
//! The process-wide logging entry point.
//!
//! `log` only accepts one global logger for the lifetime of the process, so a
//! [`Switchboard`] is installed once and every facade call goes through it to
//! whichever logger is currently plugged in. Interception swaps the buffering
//! sink in and teardown swaps the original back.

use crate::error::Result;
use log::{LevelFilter, Log, Metadata, Record};
use std::sync::{Arc, PoisonError, RwLock};

pub struct Switchboard {
    current: RwLock<Arc<dyn Log>>,
}

impl Switchboard {
    /// Build a switchboard without registering it with `log`.
    pub fn new(initial: Arc<dyn Log>) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Register a new switchboard as the global logger.
    ///
    /// Fails if a global logger has already been set. The returned reference
    /// lives for the rest of the process.
    pub fn install(initial: Arc<dyn Log>, max_level: LevelFilter) -> Result<&'static Switchboard> {
        let switchboard: &'static Switchboard = Box::leak(Box::new(Switchboard::new(initial)));
        log::set_logger(switchboard)?;
        log::set_max_level(max_level);
        Ok(switchboard)
    }

    /// Plug in `logger`, returning the one it replaces.
    pub fn replace(&self, logger: Arc<dyn Log>) -> Arc<dyn Log> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, logger)
    }

    pub fn current(&self) -> Arc<dyn Log> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Log for Switchboard {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.current().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        // clone out so the lock is not held while the logger runs
        self.current().log(record);
    }

    fn flush(&self) {
        self.current().flush();
    }
}
