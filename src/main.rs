use anyhow::Result;
use clap::Parser;
use crowcall::persist::{DriveStore, SheetsLog};
use crowcall::telegram::{event_from_update, TelegramClient};
use crowcall::{Collector, Config, Dispatcher, PersistenceGateway, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "crowcall", about = "Rooster-call voice collection bot")]
struct Args {
    /// Config file path (without extension), merged with CROWCALL_* env vars
    #[arg(long, default_value = "config/crowcall")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Crowcall v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Max voice duration: {}s, session TTL: {}s",
        cfg.collection.max_voice_secs, cfg.collection.session_ttl_secs
    );

    let http = reqwest::Client::new();
    let telegram = Arc::new(TelegramClient::new(http.clone(), cfg.bot.token.clone()));

    let log = Box::new(SheetsLog::new(http.clone(), &cfg.sheet));
    let assets = match &cfg.drive {
        Some(drive_cfg) => {
            info!("Drive upload enabled");
            Some(Box::new(DriveStore::new(
                http.clone(),
                telegram.clone(),
                drive_cfg,
            )) as Box<dyn crowcall::AssetStore>)
        }
        None => {
            info!("Drive upload disabled, persisting voice references only");
            None
        }
    };
    let gateway = PersistenceGateway::new(log, assets);

    let collector = Arc::new(Collector::new(
        SessionStore::new(),
        gateway,
        telegram.clone(),
        cfg.collection.max_voice_secs,
    ));
    let dispatcher = Dispatcher::new(
        collector,
        Duration::from_secs(cfg.collection.session_ttl_secs),
    );

    info!("Starting long-poll loop");
    run_polling(&telegram, &dispatcher, cfg.bot.poll_timeout_secs).await
}

/// Long-poll Telegram and fan updates out to the per-user workers. The
/// offset is advanced past every update we receive, processed or skipped,
/// so acknowledged updates are never re-fetched.
async fn run_polling(
    telegram: &TelegramClient,
    dispatcher: &Dispatcher,
    poll_timeout_secs: u64,
) -> Result<()> {
    let mut offset: u64 = 0;

    // The loop only ends with the process.
    loop {
        let updates = match telegram.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "getUpdates failed, backing off");
                tokio::time::sleep(Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Some(event) = event_from_update(&update) {
                dispatcher.dispatch(event).await;
            }
        }
    }
}
