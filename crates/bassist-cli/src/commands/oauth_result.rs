use bassist_core::{classify_callback, OAuthStatus};
use clap::Args;

#[derive(Args)]
pub struct OAuthResultArgs {
    /// Callback URL or query string, e.g. "oauth=success&provider=github"
    input: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: OAuthResultArgs) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = classify_callback(&args.input);

    if args.json {
        let value = serde_json::json!({
            "status": outcome.status,
            "provider": outcome.provider,
            "provider_name": outcome.provider_name,
            "message": outcome.message,
            "affordances": outcome.affordances(),
            "troubleshooting": outcome.troubleshooting_hints(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}: {}", outcome.status.title(), outcome.provider_name);
    if let Some(message) = &outcome.message {
        println!("{message}");
    }
    if outcome.status == OAuthStatus::Error {
        println!("Troubleshooting:");
        for hint in outcome.troubleshooting_hints() {
            println!("  - {hint}");
        }
    }
    let actions: Vec<&str> = outcome.affordances().iter().map(|a| a.label()).collect();
    println!("Actions: {}", actions.join(", "));
    if let Some(provider) = outcome.retry_target() {
        println!("Retry with: bassist-cli auth url {provider}");
    }
    Ok(())
}
