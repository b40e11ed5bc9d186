//! Kernel logging subsystem.
//!
//! Records are plain text with an ANSI-coloured severity prefix, handed to a
//! single sink installed at start-up. The `log` facade is bridged here, so
//! library crates can use `log::info!` and friends without knowing about the
//! sink.
#![cfg_attr(not(test), no_std)]

use core::fmt;

use spin::Once;

/// Where finished records go. Called once per record, newline included.
pub type Sink = fn(fmt::Arguments<'_>);

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
    Panic,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Panic => "panic",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Level::Error | Level::Panic => "\x1b[31m", // Red
            Level::Warning => "\x1b[33m",              // Yellow
            Level::Info => "\x1b[36m",                 // Cyan
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Level::Info,
        }
    }
}

/// One log line, rendered with its prefix and trailing newline.
pub struct Record<'a> {
    pub level: Level,
    pub args: fmt::Arguments<'a>,
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[kernel] [{}]\x1b[0m: {}\n",
            self.level.color(),
            self.level.as_str(),
            self.args
        )
    }
}

static SINK: Once<Sink> = Once::new();

struct Logger;

static LOGGER: Logger = Logger;

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        SINK.is_completed()
    }

    fn log(&self, record: &log::Record<'_>) {
        log(record.level().into(), *record.args());
    }

    fn flush(&self) {}
}

/// Install the sink and register with the `log` facade. Only the first call
/// has any effect; returns whether this call installed `sink`.
pub fn init(sink: Sink) -> bool {
    let mut installed = false;
    SINK.call_once(|| {
        installed = true;
        sink
    });
    if installed && log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
    installed
}

/// Log a message with a specific level. Dropped if no sink is installed yet.
pub fn log(level: Level, args: fmt::Arguments<'_>) {
    if let Some(sink) = SINK.get() {
        sink(format_args!("{}", Record { level, args }));
    }
}

/// Print to the sink without prefix or newline
pub fn print(args: fmt::Arguments<'_>) {
    if let Some(sink) = SINK.get() {
        sink(args);
    }
}

/// Log at INFO level
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Info, format_args!($($arg)*))
    };
}

/// Log at WARNING level
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Warning, format_args!($($arg)*))
    };
}

/// Log at ERROR level
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Error, format_args!($($arg)*))
    };
}

/// Print without newline
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::print(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::{String, ToString};
    use std::sync::Mutex;

    static CAPTURED: Mutex<String> = Mutex::new(String::new());

    fn capture(args: fmt::Arguments<'_>) {
        CAPTURED.lock().unwrap().push_str(&args.to_string());
    }

    fn captured() -> String {
        init(capture);
        CAPTURED.lock().unwrap().clone()
    }

    #[test]
    fn prefixes_match_the_console_palette() {
        let line = |level| {
            Record {
                level,
                args: format_args!("x"),
            }
            .to_string()
        };
        assert_eq!(line(Level::Error), "\x1b[31m[kernel] [error]\x1b[0m: x\n");
        assert_eq!(line(Level::Warning), "\x1b[33m[kernel] [warning]\x1b[0m: x\n");
        assert_eq!(line(Level::Info), "\x1b[36m[kernel] [info]\x1b[0m: x\n");
        assert_eq!(line(Level::Panic), "\x1b[31m[kernel] [panic]\x1b[0m: x\n");
    }

    #[test]
    fn macros_reach_the_sink() {
        init(capture);
        info!("pic remapped to {:#x}", 0x20);
        warn!("rsdp checksum mismatch");
        assert!(captured().contains("\x1b[36m[kernel] [info]\x1b[0m: pic remapped to 0x20\n"));
        assert!(captured().contains("[warning]\x1b[0m: rsdp checksum mismatch\n"));
    }

    #[test]
    fn log_facade_is_bridged() {
        init(capture);
        log::error!("bridged {}", 7);
        log::debug!("debug shows as info");
        assert!(captured().contains("[error]\x1b[0m: bridged 7\n"));
        assert!(captured().contains("[info]\x1b[0m: debug shows as info\n"));
    }

    #[test]
    fn only_the_first_sink_is_kept() {
        fn other(_: fmt::Arguments<'_>) {}
        init(capture);
        assert!(!init(other));
    }
}
