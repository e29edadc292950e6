use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "bassist-cli", version, about = "Bassist integrations CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Supported integration providers
    Providers {
        #[command(subcommand)]
        action: commands::providers::ProvidersAction,
    },
    /// OAuth authorization URLs and API headers
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Interpret an /oauth-result callback URL or query string
    OauthResult(commands::oauth_result::OAuthResultArgs),
    /// Connection status and disconnects
    Integrations {
        #[command(subcommand)]
        action: commands::integrations::IntegrationsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Providers { action } => commands::providers::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::OauthResult(args) => commands::oauth_result::run(args),
        Commands::Integrations { action } => commands::integrations::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
