//! Logging setup on the `log` facade with the `env_logger` backend.
//!
//! Level precedence:
//!
//! 1. `RUST_LOG`, when set
//! 2. `--quiet` (errors only), `-v` (debug), `-vv` (trace)
//! 3. info
//!
//! Logs go to stderr so they never mix with the report on stdout. Debug
//! builds prefix a timestamp (and the module path when verbose); release
//! builds print the level and message only.
//!
//! ```rust,no_run
//! use rmdupes::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Install the global logger.
///
/// Returns `false` if a logger was already installed, in which case the
/// existing one stays active. Safe to call more than once.
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let rust_log = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    match &rust_log {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return false;
    }

    match rust_log {
        Some(spec) => log::debug!("Logging initialized from RUST_LOG={spec}"),
        None => log::debug!(
            "Logging initialized at level: {}",
            determine_level(verbose, quiet)
        ),
    }
    true
}

/// Level selected by the CLI flags; quiet wins over verbose.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let level = record.level();
            let style = buf.default_level_style(level);
            let timestamp = buf.timestamp_seconds();
            if verbose >= 1 {
                writeln!(
                    buf,
                    "{timestamp} {style}{level:<5}{style:#} [{}] {}",
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(buf, "{timestamp} {style}{level:<5}{style:#} {}", record.args())
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let style = buf.default_level_style(level);
            writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
        });
    }
}

/// Name of the currently active maximum level.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
