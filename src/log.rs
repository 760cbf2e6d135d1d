use log::LevelFilter;
use std::env;

/// Initialize logging for the `crossword` binary. The level is `Info`, or `Debug` when
/// `debug_enabled` is set; `RUST_LOG` overrides both if it's present.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    // A logger may already be installed, e.g. by a test harness.
    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}
