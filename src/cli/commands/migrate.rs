use anyhow::Context;
use clap::Args;
use std::sync::Arc;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::cms::{CmsClient, SanityClient};
use crate::config::CmsConfig;
use crate::migrate::{self, TypeMapping};

#[derive(Args)]
pub struct MigrateArgs {
    #[arg(long, value_name = "LEGACY=NEW", help = "Type rename; repeatable (default: project=projectMeta, page=pageMeta)")]
    pub map: Vec<TypeMapping>,

    #[arg(long, help = "List what would be migrated without writing")]
    pub dry_run: bool,
}

pub async fn handle(args: MigrateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut cms = CmsConfig::from_env().context("CMS configuration")?;
    // Legacy listings must see the live dataset, not the CDN cache.
    cms.use_cdn = false;
    if cms.token.is_none() && !args.dry_run {
        anyhow::bail!("SANITY_API_TOKEN is required to write documents (use --dry-run to preview)");
    }

    let client: Arc<dyn CmsClient> = Arc::new(SanityClient::new(&cms, http_timeout()).context("CMS client")?);
    let mappings = if args.map.is_empty() {
        migrate::default_mappings()
    } else {
        args.map
    };

    let report = migrate::run(client.as_ref(), &mappings, args.dry_run)
        .await
        .context("migration aborted")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let verb = if report.dry_run { "Would migrate" } else { "Migrated" };
            println!("{} {} document(s)", verb, report.migrated.len());
            for id in &report.migrated {
                println!("  {}", id);
            }
            if report.skipped > 0 {
                println!("Skipped {} document(s) without an id", report.skipped);
            }
            for failed in &report.failed {
                eprintln!("  FAILED {}: {}", failed.id, failed.error);
            }
        }
    }

    if !report.is_clean() {
        anyhow::bail!("{} document(s) failed to migrate; re-run to retry them", report.failed.len());
    }
    Ok(())
}
