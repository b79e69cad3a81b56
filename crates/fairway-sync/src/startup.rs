//! Startup reporting.

use fairway_config::{AppConfig, ProviderKind};
use fairway_providers::ProviderFactory;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
    ______      _
   / ____/___ _(_)________ __  ______ ___  __
  / /_  / __ `/ / ___/ | /| / / __ `/ / / /
 / __/ / /_/ / / /   | |/ |/ / /_/ / /_/ /
/_/    \__,_/_/_/    |__/|__/\__,_/\__, /
                                  /____/
                  golf data sync
    "#);
}

/// Prints what this process will do.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Provider:      {}", config.provider.kind);
    info!("Cache:         {}", config.cache.namespace);
    info!(
        "Redis:         {}",
        if config.redis.is_enabled() { "enabled" } else { "disabled" }
    );
    info!("Refresh every: {}s", config.sync.refresh_interval_secs);
    if config.provider.kind == ProviderKind::ExternalApi {
        info!("Live every:    {}s", config.sync.live_refresh_interval_secs);
    }
    info!("{}", separator);
}

/// Logs the recommendation table.
pub fn print_recommendations() {
    for rec in ProviderFactory::recommendations() {
        info!(
            scale = %rec.scale,
            primary = %rec.primary,
            fallback = %rec.fallback,
            "{}",
            rec.reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_for_each_provider() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut config = AppConfig::default();
        for kind in ProviderKind::ALL {
            config.provider.kind = kind;
            print_startup_info(&config);
        }
    }

    #[test]
    fn test_print_recommendations_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_recommendations();
    }
}
