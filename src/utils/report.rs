// src/utils/report.rs: Progress reporting handed to each pipeline component

use log::Level;
#[cfg(test)]
use std::cell::RefCell;

/// Receives progress messages from discovery and consolidation steps.
/// Components take a `&dyn Reporter` rather than writing to a global logger.
pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.report(Level::Debug, message);
    }
}

/// Forwards messages to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}

/// Keeps every message in memory, in arrival order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: RefCell<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|(_, m)| m.contains(needle))
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn report(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}
