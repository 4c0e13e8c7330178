use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stderr so stdout stays clean for JSON and CSV output.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug for this crate
/// with `verbose`.
pub fn init_logging(verbose: bool) {
    let crate_name = env!("CARGO_PKG_NAME");
    let filter = if verbose {
        EnvFilter::new(format!("{crate_name}=debug,warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
