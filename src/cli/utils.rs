use serde_json::{json, Value};
use std::time::Duration;

use crate::cli::OutputFormat;

/// Outbound timeout for CLI requests, from `HTTP_TIMEOUT_SECS` (default 30s).
pub fn http_timeout() -> Duration {
    let secs = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}

/// Server base URL from an explicit flag, `BASE_URL`, or localhost.
pub fn server_url(explicit: Option<String>) -> String {
    explicit
        .or_else(|| std::env::var("BASE_URL").ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "http://localhost:3000".to_string())
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a JSON document: pretty-printed for text output, compact for JSON.
pub fn output_document(output_format: &OutputFormat, document: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(document)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(document)?),
    }
    Ok(())
}
