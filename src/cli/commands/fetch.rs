use anyhow::Context;
use clap::Subcommand;
use std::sync::Arc;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::cms::{CmsClient, SanityClient};
use crate::config::CmsConfig;
use crate::content::{ContentRequest, ContentSource, DirectSource, ProxySource};

#[derive(Subcommand)]
pub enum FetchCommands {
    #[command(about = "Site owner profile")]
    User,

    #[command(about = "About document")]
    About,

    #[command(about = "Icon, logo or asset by id")]
    Asset {
        #[arg(help = "Asset document id")]
        id: String,
    },

    #[command(about = "Content page by slug")]
    Page {
        #[arg(help = "Page slug")]
        slug: String,
    },

    #[command(about = "Project by slug")]
    Project {
        #[arg(help = "Project slug")]
        slug: String,
    },

    #[command(about = "All projects")]
    Projects,

    #[command(about = "All documents of a type")]
    Documents {
        #[arg(help = "Document type")]
        doc_type: String,
    },
}

impl From<FetchCommands> for ContentRequest {
    fn from(cmd: FetchCommands) -> Self {
        match cmd {
            FetchCommands::User => ContentRequest::User,
            FetchCommands::About => ContentRequest::About,
            FetchCommands::Asset { id } => ContentRequest::Asset { id },
            FetchCommands::Page { slug } => ContentRequest::Page { slug },
            FetchCommands::Project { slug } => ContentRequest::Project { slug },
            FetchCommands::Projects => ContentRequest::Projects,
            FetchCommands::Documents { doc_type } => ContentRequest::Documents { doc_type },
        }
    }
}

fn source(server: Option<String>) -> anyhow::Result<Box<dyn ContentSource>> {
    match server {
        Some(base) => Ok(Box::new(ProxySource::new(&base, http_timeout()).context("server URL")?)),
        None => {
            let cms = CmsConfig::from_env().context("CMS configuration")?;
            let client: Arc<dyn CmsClient> = Arc::new(SanityClient::new(&cms, http_timeout()).context("CMS client")?);
            Ok(Box::new(DirectSource::new(client)))
        }
    }
}

pub async fn handle(cmd: FetchCommands, server: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let request = ContentRequest::from(cmd);
    let source = source(server)?;

    match source.fetch(&request).await.with_context(|| format!("fetching {}", request))? {
        Some(document) => output_document(&output_format, &document),
        None => {
            output_error(&output_format, &format!("No {} found", request), Some("NOT_FOUND"))?;
            std::process::exit(2);
        }
    }
}
