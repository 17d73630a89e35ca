mod api;
mod bot;
mod cache;
mod config;
mod error;
#[cfg(test)]
mod testing;

use api::coinmarketcap::CoinMarketCapClient;
use api::discord::{ws, DiscordRest};
use bot::{CooldownGate, Dispatcher};
use cache::{Refresher, Resolver, SnapshotStore};
use clap::Parser;
use config::Config;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(version, about = "Answers !c / !crypto ticker lookups in Discord channels")]
struct Args {
    /// Path to the JSON configuration file
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("coinwatch_bot", LevelFilter::Debug)
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    info!(
        "Starting coinwatch bot for {} channels",
        config.channels.len()
    );

    let source = Arc::new(CoinMarketCapClient::new(&config)?);
    let store = Arc::new(SnapshotStore::new());
    let refresher = Refresher::new(source.clone(), store.clone());

    // The bot is useless without a catalog, so the first load must succeed.
    refresher.refresh_once().await?;
    let refresh_handle = refresher.spawn(config.refresh_interval());

    let gate = Arc::new(CooldownGate::new(
        config.channels.iter().cloned(),
        config.cooldown(),
    ));
    let resolver = Resolver::new(store, source);
    let sender = Arc::new(DiscordRest::new(&config.token, config.http_timeout())?);
    let dispatcher = Arc::new(Dispatcher::new(
        config.channels.iter().cloned(),
        gate,
        resolver,
        sender,
    ));

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(100);

    let gateway_handle = tokio::spawn({
        let token = config.token.clone();
        async move {
            loop {
                match ws::connect_to_gateway(&token, event_tx.clone()).await {
                    Ok(()) => break,
                    Err(e) => error!("Gateway session ended: {}", e),
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    });

    let dispatch_handle = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let outcome = dispatcher.handle(&event).await;
                log::debug!("{} in {}: {:?}", event.author, event.channel_id, outcome);
            });
        }
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for interrupt: {}", e);
            }
            info!("Interrupt received");
        }
        _ = gateway_handle => {},
        _ = dispatch_handle => {},
    };

    refresh_handle.cancel();
    info!("Shutdown complete");
    Ok(())
}
