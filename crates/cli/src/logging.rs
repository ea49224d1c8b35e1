use bookworm_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use tracing::Level;

/// Installs the global subscriber. Logs go to stderr; stdout belongs to the storefront screen.
pub fn init(logging: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(parse_level(&logging.level))
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!(event_name = "system.logging.already_installed", "subscriber already set");
    }
}

/// Falls back to default logging when the configuration does not load; the
/// command itself reports the configuration error.
pub fn init_from_config(options: &LoadOptions) {
    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init(&logging);
}

fn parse_level(raw: &str) -> Level {
    raw.trim().parse::<Level>().unwrap_or(Level::INFO)
}
