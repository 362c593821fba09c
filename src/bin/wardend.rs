use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use taskwarden::core::Config;
use taskwarden::features::notify::NotificationDispatcher;
use taskwarden::features::reminders::ReminderScheduler;
use taskwarden::signals::SignalHub;
use taskwarden::storage::{JsonStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting taskwarden daemon...");

    let store: Arc<dyn Store> = Arc::new(JsonStore::new(&config.data_dir)?);
    let hub = SignalHub::new();
    let dispatcher = Arc::new(NotificationDispatcher::new(hub.clone(), config.sound_enabled));
    let scheduler = ReminderScheduler::new(store, dispatcher, hub.clone())
        .with_interval(config.check_interval());

    // Headless stand-in for the modal renderer: log every fired reminder
    let mut fired_rx = hub.subscribe_fired();
    tokio::spawn(async move {
        loop {
            match fired_rx.recv().await {
                Ok(fired) => info!(
                    "⏰ Reminder fired: {} ({})",
                    fired.task.title, fired.reminder.id
                ),
                Err(RecvError::Lagged(n)) => {
                    warn!("Fired-reminder subscriber lagged, missed {n} signal(s)")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Surface non-fatal persistence failures
    let mut error_rx = hub.subscribe_store_errors();
    tokio::spawn(async move {
        while let Ok(message) = error_rx.recv().await {
            error!("Persistence failure: {message}");
        }
    });

    scheduler.start().await;
    info!(
        "📅 Scheduler running every {}s over {} - press Ctrl-C to stop",
        config.check_interval_secs, config.data_dir
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    scheduler.stop().await;

    Ok(())
}
