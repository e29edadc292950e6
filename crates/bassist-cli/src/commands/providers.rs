use bassist_core::{get_provider, list_providers, Provider};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProvidersAction {
    /// List providers in display order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one provider
    Show {
        /// Provider id (github, gitlab, bitbucket, azure, jira)
        id: String,
    },
}

pub fn run(action: ProvidersAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProvidersAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(list_providers())?);
            } else {
                for provider in list_providers() {
                    println!("{:<10} {}{}", provider.id, provider.name, status_suffix(provider));
                }
            }
        }
        ProvidersAction::Show { id } => {
            let provider = get_provider(&id)?;
            println!("{} ({})", provider.name, provider.id);
            println!("  {}", provider.description);
            println!("  scopes: {}", provider.scopes.join(", "));
            println!("  color:  {}", provider.color);
            if let Some(status) = provider.implementation_status {
                println!("  status: {}", status.label());
            }
        }
    }
    Ok(())
}

fn status_suffix(provider: &Provider) -> String {
    provider
        .implementation_status
        .map(|s| format!(" [{}]", s.label()))
        .unwrap_or_default()
}
