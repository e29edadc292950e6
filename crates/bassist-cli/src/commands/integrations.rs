use bassist_core::{Config, ConnectionState, HttpBackend, ProviderId, StatusSnapshot};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum IntegrationsAction {
    /// Show connection status for every provider
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Disconnect a provider
    Disconnect {
        /// Provider id
        provider: ProviderId,
    },
}

pub fn run(action: IntegrationsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut backend = HttpBackend::from_config(&config.backend)?;
    if let Ok(token) = std::env::var("BASSIST_SESSION_TOKEN") {
        backend = backend.with_session_token(token);
    }
    let state = ConnectionState::new(backend);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match action {
            IntegrationsAction::Status { json } => {
                let snapshot = state.refresh().await?;
                print_status(&snapshot, json)?;
            }
            IntegrationsAction::Disconnect { provider } => {
                state.disconnect(provider).await?;
                println!("{} disconnected", provider.provider().name);
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn print_status(snapshot: &StatusSnapshot, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    for status in snapshot.values() {
        let label = match (status.connected, status.stale) {
            (true, _) => "connected",
            (false, true) => "reconnect required",
            (false, false) => "not connected",
        };
        match status.connected_at {
            Some(at) => println!(
                "{:<10} {:<14} {label} since {}",
                status.provider,
                status.name,
                at.format("%Y-%m-%d")
            ),
            None => println!("{:<10} {:<14} {label}", status.provider, status.name),
        }
    }
    Ok(())
}
