use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wearbridge::{
    BridgeConfig, Envelope, EventSink, LoopbackClient, ServiceStatus, SessionCoordinator,
};

/// Wearbridge - session bridge between a host application and a paired
/// wearable accessory
#[derive(Parser)]
#[command(name = "wearbridge", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full session sequence against the built-in loopback wearable
    Demo,
    /// Check whether the companion app is installed
    Check,
}

/// Sink that logs relayed events
struct LogSink;

impl EventSink for LogSink {
    fn on_message_received(&self, text: String) {
        tracing::info!(text = %text, "message received");
    }

    fn on_service_status_changed(&self, status: ServiceStatus) {
        tracing::info!(
            connected = status.connected,
            timestamp = status.timestamp,
            "service status changed"
        );
    }
}

fn print_envelope(operation: &str, envelope: &Envelope) -> anyhow::Result<()> {
    println!("== {operation}\n{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

async fn run_demo(coordinator: &SessionCoordinator) -> anyhow::Result<()> {
    print_envelope("discoverNode", &coordinator.discover_node().await)?;
    print_envelope("requestPermissions", &coordinator.request_permissions().await)?;
    print_envelope("startListening", &coordinator.start_listening().await)?;
    print_envelope("sendMessage", &coordinator.send_message("hello wearable").await)?;
    print_envelope(
        "sendNotification",
        &coordinator.send_notification("Weather", "Clear, 21°C").await,
    )?;
    print_envelope(
        "checkCompanionAppInstalled",
        &coordinator.check_companion_app_installed().await,
    )?;
    print_envelope(
        "checkRemoteAppInstalled",
        &coordinator.check_remote_app_installed().await,
    )?;
    print_envelope("launchRemoteApp", &coordinator.launch_remote_app("").await)?;

    // Give the relay a moment to deliver the echoed message
    tokio::time::sleep(Duration::from_millis(50)).await;

    print_envelope("stopListening", &coordinator.stop_listening().await)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "info,wearbridge=debug",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = BridgeConfig::from_env();
    let (loopback, events) = LoopbackClient::new();
    let coordinator =
        SessionCoordinator::new(loopback.capability_client(), Arc::new(LogSink), config);
    coordinator.attach_transport(events).await;

    match cli.command {
        Command::Demo => run_demo(&coordinator).await?,
        Command::Check => {
            print_envelope(
                "checkCompanionAppInstalled",
                &coordinator.check_companion_app_installed().await,
            )?;
        }
    }

    coordinator.shutdown().await;
    Ok(())
}
