//! Interrupt reporting.
//!
//! On SIGINT the record being processed is reported on stderr and the
//! process exits at once. The finalization fragment does not run.

use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Exit status after an interrupt (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Index of the record currently being processed, readable from the
/// signal handler thread.
#[derive(Debug, Clone, Default)]
pub struct Progress(Arc<AtomicU64>);

impl Progress {
    pub fn set(&self, record: u64) {
        self.0.store(record, Ordering::Relaxed);
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

pub fn message(record: u64) -> String {
    format!("Interrupted by SIGINT while processing record {}", record)
}

/// Install the SIGINT handler. Can only be done once per process.
pub fn install(progress: Progress) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        eprintln!("{}", message(progress.current()));
        process::exit(EXIT_INTERRUPTED);
    })
}
