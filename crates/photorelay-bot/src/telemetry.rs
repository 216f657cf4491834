use photorelay_core::{LogFormat, LogLevel};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set. HTTP client crates are capped at `warn`.
pub fn default_directives(level: LogLevel) -> String {
    format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn",
        level.as_filter()
    )
}

/// Initialize tracing. `RUST_LOG` overrides `LOG_LEVEL`.
pub fn init_telemetry(level: LogLevel, format: LogFormat) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cap_http_crates() {
        let directives = default_directives(LogLevel::Debug);
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
