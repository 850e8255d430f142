//! Log backend setup for binaries and tools embedding the field generator

/// Install env_logger with millisecond timestamps.
///
/// The filter defaults to `info`; `RUST_LOG` overrides it, e.g.
/// `RUST_LOG=astrofield::lifecycle=debug` to watch cells stream in and out.
/// Calling it a second time is a no-op.
///
/// # Example
/// ```
/// astrofield::core::logging::init();
/// astrofield::core::logging::init();
/// log::info!("Field session started");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init();
        init();
        log::debug!("logger installed");
    }
}
