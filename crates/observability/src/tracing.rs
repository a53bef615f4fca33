//! Tracing/logging initialization.
//!
//! Decision events carry structured fields (`decision_id`, `item_id`,
//! `stage`, `source`, `attempt`), so the default output is JSON lines.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    /// Human-readable output for local runs.
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Json,
        }
    }
}

impl LogSettings {
    /// Reads `PUTAWAY_LOG_FORMAT` (`json` or `pretty`); unknown values keep JSON.
    pub fn from_env() -> Self {
        Self::from_format_var(std::env::var("PUTAWAY_LOG_FORMAT").ok().as_deref())
    }

    fn from_format_var(value: Option<&str>) -> Self {
        Self {
            format: value.and_then(LogFormat::parse).unwrap_or(LogFormat::Json),
            ..Self::default()
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(settings: LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_variable_is_parsed_leniently() {
        assert_eq!(LogSettings::from_format_var(Some(" Pretty ")).format, LogFormat::Pretty);
        assert_eq!(LogSettings::from_format_var(Some("xml")).format, LogFormat::Json);
        assert_eq!(LogSettings::from_format_var(None), LogSettings::default());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init(LogSettings::default());
        init(LogSettings {
            format: LogFormat::Pretty,
            ..LogSettings::default()
        });
        tracing::info!("still logging");
    }
}
