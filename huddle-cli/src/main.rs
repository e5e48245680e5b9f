use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use huddle::SignalMessage;
use huddle::codec::decode;
use huddle::coordinator::{
    Coordinator, CoordinatorConfig, LinkEvent, LinkState, RelayConnection, TransportConfig,
    WebRtcNegotiatorFactory,
};
use huddle::model::IceServerConfig;
use huddle::relay::RelayConfig;
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "WebRTC signaling relay and coordinator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the websocket signaling relay.
    Relay {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },

    /// Join a group through a relay and negotiate with every member.
    Join {
        #[arg(long, default_value = "ws://localhost:3000")]
        relay: String,

        #[arg(short, long)]
        group: String,

        /// STUN/TURN urls; defaults to public STUN servers.
        #[arg(long = "ice-server")]
        ice_servers: Vec<String>,
    },

    /// Decode one signaling frame from a file, or stdin with `-`.
    Inspect { input: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay { host, port } => run_relay(host, port).await,
        Commands::Join {
            relay,
            group,
            ice_servers,
        } => run_join(relay, group, ice_servers).await,
        Commands::Inspect { input } => inspect(&input),
    }
}

async fn run_relay(host: String, port: u16) -> Result<()> {
    let config = RelayConfig::new(host, port).with_turn_from_env();

    println!("{}", "📡 Starting Huddle relay...".green().bold());
    println!("   🔌 Listening: {}", config.bind_addr());
    for server in &config.ice_servers {
        println!("   🧊 ICE:       {}", server.urls.join(", "));
    }

    huddle::relay::serve(config).await
}

async fn run_join(relay: String, group: String, ice_servers: Vec<String>) -> Result<()> {
    let mut transport = TransportConfig::default();
    if !ice_servers.is_empty() {
        transport.ice_servers = ice_servers.into_iter().map(IceServerConfig::stun).collect();
    }

    let factory = WebRtcNegotiatorFactory::new(transport).context("Failed to set up WebRTC")?;
    let (output, inbound) = RelayConnection::connect(&relay, &group).await?;
    let (coordinator, handle) = Coordinator::new(
        CoordinatorConfig::default(),
        Arc::new(factory),
        Arc::new(output),
    );

    println!(
        "{}",
        format!("🚀 Joining group '{}' via {}", group, relay).green().bold()
    );

    let mut events = handle.observer().subscribe();
    let coordinator_task = tokio::spawn(coordinator.run());
    let mut pump = tokio::spawn(inbound.pump(handle.clone()));

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            result = &mut pump => {
                result.context("Relay reader panicked")??;
                println!("{}", "Relay connection closed".yellow());
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Leaving group".yellow());
                break;
            }
        }
    }

    pump.abort();
    drop(events);
    drop(handle);
    coordinator_task.await.context("Coordinator panicked")?;
    Ok(())
}

fn print_event(event: &LinkEvent) {
    match event {
        LinkEvent::LinkAdded { remote_id } => {
            println!("{} {}", "+ link".cyan(), remote_id);
        }
        LinkEvent::StateChanged { remote_id, from, to } => {
            let to_text = format!("{}", to);
            let to_text = match to {
                LinkState::Connected => to_text.green().bold(),
                LinkState::Failed => to_text.red().bold(),
                _ => to_text.normal(),
            };
            println!("  {} {} -> {}", remote_id, from, to_text);
        }
        LinkEvent::LinkFailed { remote_id, reason } => {
            println!("{} {}: {}", "✗ failed".red().bold(), remote_id, reason);
        }
    }
}

fn inspect(input: &str) -> Result<()> {
    let raw = if input == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read(input).with_context(|| format!("Failed to read {input}"))?
    };

    let message = decode(&raw).context("Not a valid signaling frame")?;

    println!("{} {}", "kind:".cyan(), message.kind().to_string().bold());
    match &message {
        SignalMessage::Roster { ids, self_id } => {
            println!("{} {}", "self:".cyan(), self_id);
            let others: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            println!("{} [{}]", "members:".cyan(), others.join(", "));
        }
        _ => {
            if let (Some(from), Some(to)) = (message.sender(), message.recipient()) {
                println!("{} {} -> {}", "route:".cyan(), from, to);
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(())
}
