//! Tracing subscriber initialization shared by both binaries.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the `--log-level` flag. Diagnostics go
/// to stderr so the rendered report on stdout stays clean.
pub fn init(log_format: &str, log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if normalize_log_format(log_format) == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn normalize_log_format(format: &str) -> &str {
    match format.to_lowercase().as_str() {
        "json" => "json",
        "pretty" | "compact" | "text" => "pretty",
        _ => {
            eprintln!(
                "WARN: Invalid log format '{}', defaulting to 'pretty'. Valid options: json, pretty",
                format
            );
            "pretty"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_formats() {
        assert_eq!(normalize_log_format("json"), "json");
        assert_eq!(normalize_log_format("JSON"), "json");
        assert_eq!(normalize_log_format("pretty"), "pretty");
        assert_eq!(normalize_log_format("compact"), "pretty");
        assert_eq!(normalize_log_format("text"), "pretty");
    }

    #[test]
    fn test_normalize_invalid_format_falls_back() {
        assert_eq!(normalize_log_format("yaml"), "pretty");
    }
}
