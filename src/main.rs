use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use log::{error, info, LevelFilter};
use prometheus::Registry;
use std::sync::Arc;
use tokio::sync::watch;

use dex_alert_bot::api::DexScreenerClient;
use dex_alert_bot::cli::Cli;
use dex_alert_bot::config::Config;
use dex_alert_bot::logging;
use dex_alert_bot::metrics::ScanMetrics;
use dex_alert_bot::scanner::Scanner;
use dex_alert_bot::scheduler::Scheduler;
use dex_alert_bot::telegram::TelegramNotifier;
use dex_alert_bot::web::HealthServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match &cli.log_file {
        Some(path) => logging::init_file(path, level)?,
        None => logging::init_stderr(level),
    }

    info!("Starting DEX alert bot...");

    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::load(path)
                .map_err(|e| anyhow::anyhow!("Failed to load configuration from {:?}: {}", path, e))?;
            config.apply_env_overrides()?;
            config
        }
        None => Config::from_env()?,
    };
    config.validate()?;
    info!(
        "Configuration loaded: {} sources, scanning every {}s",
        config.sources.len(),
        config.scan.interval_seconds
    );

    let registry = Arc::new(Registry::new());
    let metrics = ScanMetrics::new(&registry)?;

    let client = DexScreenerClient::new(config.scan.request_timeout(), config.pacing.request_delay())?;
    let notifier = TelegramNotifier::new(&config.telegram.bot_token, &config.telegram.chat_id)?;
    if let Err(e) = notifier.initialize().await {
        error!("Failed to initialize Telegram bot: {}", e);
        return Ok(());
    }

    let mut scanner = Scanner::new(
        &config,
        Arc::new(client),
        Arc::new(notifier.clone()),
        metrics.clone(),
    );
    scanner.set_dry_run(cli.dry_run);

    if cli.once {
        let report = scanner.scan_once().await?;
        info!("Single scan finished: {:?}", report);
        return Ok(());
    }

    if let Err(e) = scanner.announce_startup().await {
        error!("Failed to send startup notice: {}", e);
    }

    if let Some(port) = config.server.port {
        let server = HealthServer::new(registry.clone());
        tokio::spawn(server.start(port));
    }

    if config.telegram.enable_commands {
        tokio::spawn(notifier.run_commands(metrics.clone()));
        info!("Telegram command handler started");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut scheduler = Scheduler::new(scanner, &config.scan, metrics);
    scheduler.run(shutdown_rx).await;

    info!("DEX alert bot stopped");
    Ok(())
}
