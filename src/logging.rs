//! Log output setup.
//!
//! Library code only emits `tracing` events. The binary picks the sink by
//! installing a subscriber built here; tests can build one around their own
//! writer and scope it with `tracing::subscriber::with_default`.

use crate::error::{Error, Result};
use chrono::Local;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Local wall-clock timestamps, e.g. `2024-03-01 09:15:02.114`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Map CLI flags to a filter directive.
pub fn log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Build a subscriber writing timestamped, leveled lines to `writer`.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn build_subscriber<W>(level: &str, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_timer(LocalTimer)
        .with_writer(writer)
        .finish()
}

/// Install the process-wide subscriber writing to stdout.
pub fn init(level: &str) -> Result<()> {
    tracing::subscriber::set_global_default(build_subscriber(level, std::io::stdout))
        .map_err(|e| Error::InvalidConfig(format!("logging already initialised: {}", e)))
}
