mod channel;
mod commands;
mod common;
mod config;
mod scheduler;
mod update;

use crate::commands::weather::weather;
use crate::common::{AppState, Data};
use crate::config::Config;
use anyhow::Context as _;
use serenity::all::GatewayIntents;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storm_worker::cache::ChannelCache;
use storm_worker::eonet::EonetClient;
use storm_worker::storm::StormRenderer;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stdout plus, when configured, a plain-text log file. Returns why the file
/// could not be opened, to be logged once logging works.
fn init_logging(log_file: Option<&Path>) -> Option<String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file, file_error) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(format!("cannot open log file {}: {}", path.display(), e))),
        },
        None => (None, None),
    };
    let file_layer = file.map(|file| fmt::layer().with_ansi(false).with_writer(Arc::new(file)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    file_error
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    if let Some(e) = init_logging(config::log_file().as_deref()) {
        warn!("{}", e);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    if config.nasa_api_key.is_empty() {
        warn!("NASA_API_KEY is not set, EONET requests will be sent without a key");
    }

    fs::create_dir_all(&config.cache_dir)
        .with_context(|| format!("cannot create cache directory {}", config.cache_dir.display()))?;

    let renderer = StormRenderer::builder(config.cache_dir.clone())
        .font_path(config.font_path.clone())
        .build()?;
    let eonet = EonetClient::builder(config.nasa_api_key.clone())
        .proxy(config.proxy_url.clone())
        .timeout_duration(Duration::from_secs(20))
        .build();
    let cache = ChannelCache::open(&config.cache_dir);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let intents = GatewayIntents::GUILDS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![weather()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("synced commands globally");

                let app = Arc::new(AppState {
                    cache: Mutex::new(cache),
                    eonet,
                    renderer,
                    bot_id: ready.user.id,
                });

                tokio::spawn(scheduler::run_scheduler(ctx.http.clone(), app.clone(), shutdown_rx));
                info!("started scheduled weather updates task");

                Ok(Data { app })
            })
        })
        .build();

    let mut client = serenity::Client::builder(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("cannot create the Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for ctrl-c");
            // holding the sender keeps the scheduler running
            std::future::pending::<()>().await;
            return;
        }
        info!("shutting down");
        // the scheduler goes first, then the gateway connection
        let _ = shutdown_tx.send(true);
        shard_manager.shutdown_all().await;
    });

    client.start_autosharded().await?;
    Ok(())
}
