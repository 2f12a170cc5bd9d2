use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::SessionVerifier;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::SecurityConfig;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, default_value = "operator", help = "Subject (user id)")]
    pub sub: String,

    #[arg(long, help = "Email shown in the studio")]
    pub email: Option<String>,

    #[arg(long, help = "Role claim (default: ADMIN_ROLE or admin)")]
    pub role: Option<String>,

    #[arg(long, default_value_t = 1, help = "Lifetime in hours")]
    pub hours: u64,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let secret = std::env::var("SESSION_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .context("SESSION_SECRET must be set to sign tokens")?;
    let mut security = SecurityConfig::defaults(secret, args.hours);
    if let Ok(role) = std::env::var("ADMIN_ROLE") {
        security.admin_role = role;
    }

    let role = args.role.unwrap_or_else(|| security.admin_role.clone());
    let token = SessionVerifier::new(&security)
        .issue(&args.sub, args.email, &role)
        .context("signing session token")?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Session token issued",
            Some(json!({ "token": token, "role": role, "expires_in": args.hours * 3600 })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
