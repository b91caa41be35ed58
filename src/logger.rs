//! Console backend for the `log` facade: timestamped, level-colored lines.
//! Installed once by the binary; library code only uses the `log` macros.

use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger {
    level: LevelFilter,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => " WARN".yellow(),
            Level::Info => " INFO".green(),
            Level::Debug => "DEBUG".cyan(),
            Level::Trace => "TRACE".dimmed(),
        };
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");

        println!(
            "{} {} {} {}",
            timestamp.to_string().dimmed(),
            tag,
            record.target().dimmed(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Install the console logger. Safe to call more than once; later calls
/// are no-ops.
pub fn init(level: LevelFilter) {
    if log::set_boxed_logger(Box::new(ConsoleLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
