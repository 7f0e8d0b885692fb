//! Stderr logger for the binaries. Stdout stays free for machine-readable output.

use std::env;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable naming the log level (`off`, `error` .. `trace`).
pub const LOG_ENV: &str = "BATTLESHIP_LOG";

static STARTED: OnceLock<Instant> = OnceLock::new();

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = STARTED.get().map_or(0, |start| start.elapsed().as_millis());
        eprintln!(
            "{elapsed:>7}ms {:<5} {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Level named by `BATTLESHIP_LOG`; `info` when unset or not a level.
pub fn level_from_env() -> LevelFilter {
    env::var(LOG_ENV)
        .ok()
        .and_then(|lvl| lvl.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the logger once; later calls keep the first logger.
pub fn init_logging() {
    STARTED.get_or_init(Instant::now);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_from_env());
    }
}
