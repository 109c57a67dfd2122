use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use weatherbot::config::Config;
use weatherbot::telegram::{TelegramClient, TelegramTransport};
use weatherbot::weather::OpenWeatherClient;
use weatherbot::{Bot, Dispatcher, LocationStore, RateLimiter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weatherbot=info".into()),
        )
        .init();

    info!("Weatherbot starting...");

    let config = Config::load().context("Failed to load configuration")?;
    let settings = &config.settings;
    info!(
        rate_limit_per_minute = settings.rate_limit.max_requests_per_minute,
        poll_timeout_secs = settings.telegram.poll_timeout_seconds,
        weather_timeout_secs = settings.weather.request_timeout_seconds,
        "Configuration loaded"
    );

    let telegram = TelegramClient::with_base_url(
        config.secrets.telegram_bot_token.clone(),
        settings.telegram.api_url.clone(),
        Duration::from_secs(settings.telegram.request_timeout_seconds),
    )
    .context("Failed to build Telegram client")?;

    let me = telegram
        .get_me()
        .await
        .context("Failed to authorize with Telegram")?;
    info!(
        username = me.username.as_deref().unwrap_or(&me.first_name),
        "Authorized on account"
    );

    let weather = OpenWeatherClient::with_base_url(
        config.secrets.weather_api_key.clone(),
        settings.weather.api_url.clone(),
        Duration::from_secs(settings.weather.request_timeout_seconds),
    )
    .context("Failed to build weather client")?;

    let dispatcher = Dispatcher::new(
        Arc::new(RateLimiter::new(settings.rate_limit.max_requests_per_minute)),
        Arc::new(LocationStore::new()),
        Arc::new(weather),
    );
    let transport = Arc::new(TelegramTransport::new(
        telegram,
        settings.telegram.poll_timeout_seconds,
    ));
    let bot = Bot::new(
        transport,
        dispatcher,
        Duration::from_secs(settings.telegram.retry_delay_seconds),
    );

    bot.run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    })
    .await;

    Ok(())
}
