//! icontrol gateway - virtual knobs and long-press buttons for momentary MIDI switches

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icontrol_gw::config::{AppConfig, TriggerTable};
use icontrol_gw::engine::{policy_for, Engine};
use icontrol_gw::transport::{self, MidiTransport};

/// icontrol gateway - virtual knobs from momentary MIDI switches
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// Validate the configuration, print the trigger table and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting icontrol gateway...");

    if args.list_ports {
        transport::print_ports()?;
        return Ok(());
    }

    info!("Configuration file: {}", args.config);
    let config = AppConfig::load(&args.config)
        .await
        .with_context(|| format!("Failed to load configuration: {}", args.config))?;
    let table = config.trigger_table()?;
    info!("Configuration loaded with {} triggers", table.len());

    if args.check {
        print_table(&config, &table);
        return Ok(());
    }

    let (mut transport, input, output) = MidiTransport::connect(&config.midi, &config.input)
        .context("Failed to open MIDI ports")?;
    info!("MIDI ports open");

    let mut engine = Engine::new(
        table,
        config.timing.clone(),
        policy_for(config.input.release),
        input,
        output,
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Ready to translate MIDI events!");

    tokio::select! {
        result = engine.run() => {
            result.context("Translation engine stopped")?;
            anyhow::bail!("MIDI input ended unexpectedly");
        }
        _ = &mut shutdown => {
            info!("Shutdown signal received, stopping event loop");
        }
    }

    transport.disconnect();
    info!("icontrol gateway shutdown complete");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_table(config: &AppConfig, table: &TriggerTable) {
    println!("\n{}", "=== Trigger Table ===".bold().cyan());
    println!(
        "  Input: {:?} messages, release detection {:?}",
        config.input.kind, config.input.release
    );

    for row in table.rows() {
        let paired = row
            .paired_target()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let target = if row.is_program_change() {
            format!("program slider {}", row.target)
        } else {
            format!("cc {}", row.target)
        };
        println!(
            "  {} -> {} ch:{} mode:{} paired:{}",
            row.trigger.to_string().yellow(),
            target.green(),
            row.channel,
            row.mode,
            paired
        );
    }

    println!("\n{}", "✅ Configuration is valid".green().bold());
}
