use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use classifieds_gateway::admin::token::JwtVerifier;

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "Admin CLI for the classifieds gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token of an admin user
    #[arg(short, long, env = "GATECTL_TOKEN", default_value = "")]
    token: String,

    /// Admin API prefix
    #[arg(long, default_value = "/api/admin")]
    admin_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the public maintenance status
    Status,
    /// Switch maintenance mode
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceAction,
    },
    /// Show the effective policy and current count for a rate group
    Limits { group: String },
    /// Mint a bearer token locally
    Token {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        email: String,
        #[arg(long, env = "GATEWAY_JWT_SECRET")]
        secret: String,
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[derive(Subcommand)]
enum MaintenanceAction {
    On {
        #[arg(short, long)]
        message: Option<String>,
    },
    Off,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let admin = format!("{}{}", cli.url, cli.admin_prefix.trim_end_matches('/'));

    let mut headers = HeaderMap::new();
    if !cli.token.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.token))?,
        );
    }

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/api/maintenance/status", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Maintenance { action } => {
            let body = match action {
                MaintenanceAction::On { message } => json!({ "enabled": true, "message": message }),
                MaintenanceAction::Off => json!({ "enabled": false }),
            };
            let res = client
                .put(format!("{admin}/config"))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Limits { group } => {
            let res = client
                .get(format!("{admin}/rate-limits/{group}"))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Token {
            user_id,
            email,
            secret,
            ttl_hours,
        } => {
            let token = JwtVerifier::new(secret).issue(user_id, &email, ttl_hours)?;
            println!("{token}");
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("gateway returned status {status}: {body}")]
struct StatusError {
    status: reqwest::StatusCode,
    body: String,
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;
    let json = parse_response(status, body)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Non-2xx answers become errors so the process exits non-zero.
fn parse_response(
    status: reqwest::StatusCode,
    body: String,
) -> Result<Value, Box<dyn std::error::Error>> {
    if !status.is_success() {
        return Err(StatusError { status, body }.into());
    }
    Ok(serde_json::from_str(&body)?)
}
