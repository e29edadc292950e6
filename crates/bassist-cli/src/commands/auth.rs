use bassist_core::{build_auth_header, Config, OAuthSettings, ProviderId};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Print a fresh authorization URL for a provider
    Url {
        /// Provider id
        provider: ProviderId,
        /// Open the URL in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Print the API authorization header for a token
    Header {
        /// Provider id
        provider: ProviderId,
        /// Access token
        #[arg(long)]
        token: String,
    },
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Url { provider, open } => {
            let config = Config::load()?;
            let settings = OAuthSettings::from_config(&config)?;
            let request = settings.authorization_request(provider)?;
            println!("{}", request.url);
            eprintln!("state: {}", request.state);
            if open {
                open::that(&request.url)?;
            }
        }
        AuthAction::Header { provider, token } => {
            let headers = build_auth_header(provider, &token);
            for (name, value) in headers.iter() {
                println!("{name}: {value}");
            }
        }
    }
    Ok(())
}
