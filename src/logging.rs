use tracing_subscriber::EnvFilter;

/// Log targets that receive output at the chosen level.
const TARGETS: &[&str] = &["malaysia_calendar", "conversion", "remote", "cache", "calendar"];

/// Initialize tracing from the `-v` count: none → warn, `-v` → info,
/// `-vv` → debug, more → trace. `RUST_LOG` wins when set.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let default_filter = TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_target(true)
        .compact()
        .init();
}
