// Simeis Autonomous Agent - Main Entry Point

use clap::Parser;
use simeis_cc::admiral::{Admiral, RunOutcome};
use simeis_cc::client::{GameApi, GameRemote, SimeisClient};
use simeis_cc::config::{ConfigManager, DEFAULT_CONFIG_PATH};
use simeis_cc::operations::{PlayerSession, PriceMonitor, SetupError};
use simeis_cc::output_broker::{get_output_broker, init_output_broker};
use simeis_cc::shutdown::stop_channel;
use simeis_cc::storage::SessionStore;
use simeis_cc::verbosity::set_verbosity_level;
use simeis_cc::{o_error, o_info, o_summary};
use std::sync::Arc;

/// Autonomous mining and trading agent for a Simeis server
#[derive(Parser, Debug)]
#[command(name = "simeis_cc")]
#[command(about = "Play Simeis autonomously: mine, sell, upgrade")]
struct Cli {
    /// Player name; letters and digits are kept, lowercased
    username: String,

    /// Configuration file, created with defaults when missing
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Increase output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Append every API call to the configured log file
    #[arg(long, default_value_t = false)]
    api_log: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    set_verbosity_level(cli.verbose);
    init_output_broker();

    o_summary!("🚀 Simeis Autonomous Agent starting as {}", cli.username);

    let config_manager = ConfigManager::new(&cli.config)?;
    let config = config_manager.config().clone();

    let mut client = SimeisClient::new(&config.server)?;
    if cli.api_log {
        client.set_api_logging(true);
        o_info!("📝 API calls logged to {}", config.server.api_log_path);
    }
    o_info!("🌐 Server: {}", client.base_url());
    let remote: Arc<dyn GameRemote> = Arc::new(client);
    let api = GameApi::new(remote);

    let store = SessionStore::new(&config.storage.session_dir);
    let session = match PlayerSession::establish(api.clone(), &store, &cli.username).await {
        Ok(session) => session,
        Err(SetupError::PlayerLost { money }) => {
            o_error!("💀 Player already lost ({:.2} credits), restart the server to reset the game", money);
            get_output_broker().flush_and_wait().await;
            return Ok(());
        }
        Err(e) => {
            o_error!("❌ Session setup failed: {}", e);
            get_output_broker().flush_and_wait().await;
            return Err(e.into());
        }
    };
    o_summary!("✅ Playing as {} (player {})", session.username(), session.player_id());

    let (stop_handle, stop) = stop_channel();
    let mut admiral = Admiral::new(session, config_manager, stop.clone());
    if let Err(e) = admiral.initialize().await {
        o_error!("❌ Game initialisation failed: {}", e);
        get_output_broker().flush_and_wait().await;
        return Err(e.into());
    }

    let monitor = if config.market.enabled {
        let monitor = PriceMonitor::new(api.clone(), config.market.clone(), stop.clone());
        Some(tokio::spawn(monitor.run()))
    } else {
        None
    };
    let mut scheduler = tokio::spawn(async move { admiral.run_continuous_operations().await });

    o_summary!("🎖️ Admiral ready, press Ctrl+C to stop");
    let outcome = tokio::select! {
        joined = &mut scheduler => Some(joined),
        _ = tokio::signal::ctrl_c() => {
            o_summary!("🛑 Stop requested, finishing current step...");
            None
        }
    };
    stop_handle.stop();

    let grace = config.timing.shutdown_grace();
    let outcome = match outcome {
        Some(joined) => joined.ok(),
        None => tokio::time::timeout(grace, scheduler).await.ok().and_then(|joined| joined.ok()),
    };
    if let Some(monitor) = monitor {
        let _ = tokio::time::timeout(grace, monitor).await;
    }

    match outcome {
        Some(RunOutcome::Lost) => o_summary!("💀 Game over: the player has no credits left"),
        Some(RunOutcome::Stopped) => o_summary!("👋 Operations stopped"),
        None => o_error!("⚠️ Scheduler did not finish within {:.1}s", grace.as_secs_f64()),
    }

    get_output_broker().flush_and_wait().await;
    Ok(())
}
