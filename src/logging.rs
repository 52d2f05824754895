// src/logging.rs

/// Install `env_logger` with an `info` default, overridable through `RUST_LOG`.
pub fn init() {
    init_with_filter("info");
}

/// Same as [`init`] with a caller-chosen default filter. Repeated calls are ignored.
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let result = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialized (default filter: {})", default_filter);
    }
}
