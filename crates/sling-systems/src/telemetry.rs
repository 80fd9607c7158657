//! Tracing setup for robot binaries.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls filtering (default `info`); setting
/// `SLING_LOG_FORMAT=json` switches to line-delimited JSON output.
/// Calling this more than once is harmless: later calls leave the
/// existing subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let json = std::env::var("SLING_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let result = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    // A subscriber installed by a test harness or an embedding binary
    // wins; there is nothing useful to do with the error.
    drop(result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
