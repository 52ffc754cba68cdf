//! Command line plumbing shared by the hex8 binaries.

use std::sync::Mutex;

pub use clap;
pub use clap_verbosity_flag as verbose;

/// Terminal styles of the `--help` output.
pub fn get_styles() -> clap::builder::Styles {
    use clap::builder::styling::{AnsiColor, Effects, Styles};

    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Map the `-v`/`-q` verbosity onto tracing levels. The default (no flag)
/// only reports errors.
pub fn verbose_level_to_trace(level: Option<verbose::Level>) -> &'static tracing::Level {
    match level {
        Some(verbose::Level::Error) => &tracing::Level::WARN,
        Some(verbose::Level::Warn) => &tracing::Level::INFO,
        Some(verbose::Level::Info) => &tracing::Level::DEBUG,
        Some(verbose::Level::Debug) => &tracing::Level::TRACE,
        Some(verbose::Level::Trace) => &tracing::Level::TRACE,
        None => &tracing::Level::ERROR,
    }
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr in the human readable format. If `file` is given, they
/// are written to that file as JSON lines instead.
pub fn logging_setup(level: &tracing::Level, file: Option<&std::fs::File>) {
    let builder = tracing_subscriber::fmt().with_max_level(*level);
    let file = file.and_then(|f| f.try_clone().ok());

    let r = match file {
        Some(file) => builder.json().with_writer(Mutex::new(file)).try_init(),
        None => builder
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .try_init(),
    };
    if let Err(e) = r {
        eprintln!("failed to setup logging: {e}");
    }
}
