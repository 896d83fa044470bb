use chrono::Utc;
use std::fmt;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Maps a numeric verbosity to a level filter.
///
/// `0` only lets errors through, `1` adds warnings, `2` adds info and
/// anything above enables debug output.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// `HH:MM:SS` stamps in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Utc::now().format("%H:%M:%S"))
    }
}

/// A console subscriber at the given verbosity, wrapped as a dispatch handle.
///
/// The handle is meant to be injected into a dispatcher; it is never
/// installed as the global default.
pub fn console(verbose: u8) -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level_from_verbosity(verbose))
        .with_timer(ClockTime)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}
