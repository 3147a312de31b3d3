use log::LevelFilter;

/// Initialises `env_logger` with `level` as the default filter. `RUST_LOG`
/// overrides it. Calling this more than once is harmless.
pub fn init(level: &str) {
    let filter = parse_level(level);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

pub fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}
