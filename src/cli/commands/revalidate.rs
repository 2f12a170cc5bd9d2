use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::handlers::public::revalidate::SECRET_HEADER;

#[derive(Args)]
pub struct RevalidateArgs {
    #[arg(help = "Document type whose pages should be re-rendered (e.g. projectMeta)")]
    pub doc_type: String,

    #[arg(long, help = "Server base URL (default: BASE_URL or http://localhost:3000)")]
    pub server: Option<String>,

    #[arg(long, env = "REVALIDATE_SECRET", hide_env_values = true, help = "Revalidation secret")]
    pub secret: Option<String>,
}

pub async fn handle(args: RevalidateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = server_url(args.server);
    let url = url::Url::parse(&base)
        .and_then(|b| b.join("/api/revalidate"))
        .with_context(|| format!("invalid server URL {}", base))?;

    let client = reqwest::Client::builder().timeout(http_timeout()).build()?;
    let mut request = client.post(url.clone()).json(&json!({ "_type": args.doc_type }));
    if let Some(secret) = &args.secret {
        request = request.header(SECRET_HEADER, secret);
    }

    let response = request.send().await.with_context(|| format!("POST {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("revalidation failed");
        output_error(&output_format, &format!("{} ({})", message, status), Some("REVALIDATE_FAILED"))?;
        anyhow::bail!("server answered {}", status);
    }

    output_success(
        &output_format,
        &format!("Revalidated pages for {}", args.doc_type),
        Some(json!({ "now": body.get("now").cloned().unwrap_or(Value::Null) })),
    )
}
