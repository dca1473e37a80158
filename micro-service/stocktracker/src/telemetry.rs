use app_config::{LoggingConfig, SentryConfig};
use app_error::{AppErrorExt, AppResult};
use sentry::ClientInitGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Start the Sentry client. Returns `None` (reporting disabled) when no DSN
/// is configured; the guard must be held for the life of the process.
pub fn init_sentry(config: &SentryConfig) -> Option<ClientInitGuard> {
    if config.dsn.trim().is_empty() {
        return None;
    }

    Some(sentry::init((
        config.dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            sample_rate: config.sample_rate,
            traces_sample_rate: config.traces_sample_rate,
            ..Default::default()
        },
    )))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .config_err()?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(sentry_tracing::layer());

    let result = if config.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    result.config_err()
}
