use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::render::UnknownSectionPolicy;

/// Startup configuration failures. These are fatal: the server refuses to run
/// without a signing secret or a CMS project.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub cms: CmsConfig,
    pub security: SecurityConfig,
    pub render: RenderConfig,
    pub external: ExternalConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub base_url: String,
    pub http_timeout_secs: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub api_host: Option<String>,
    pub use_cdn: bool,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_cookie: String,
    pub session_expiry_hours: u64,
    pub admin_role: String,
    pub protected_prefixes: Vec<String>,
    pub login_path: String,
    #[serde(skip_serializing)]
    pub revalidate_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub locale: String,
    pub unknown_sections: UnknownSectionPolicy,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    pub github_api: String,
    pub github_username: Option<String>,
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Presets are
    /// picked from `APP_ENV`, then individual variables override them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let cms = CmsConfig::from_lookup(&lookup, environment)?;

        let session_secret = non_empty(lookup("SESSION_SECRET")).ok_or(ConfigError::Missing("SESSION_SECRET"))?;

        let mut config = match environment {
            Environment::Production => Self::production(cms, session_secret),
            Environment::Staging => Self::staging(cms, session_secret),
            Environment::Development => Self::development(cms, session_secret),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{}' is not a port number", v),
            })?;
        }
        if let Some(v) = non_empty(lookup("BASE_URL")) {
            url::Url::parse(&v).map_err(|e| ConfigError::Invalid {
                name: "BASE_URL",
                reason: e.to_string(),
            })?;
            self.server.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("HTTP_TIMEOUT_SECS") {
            self.server.http_timeout_secs = v.parse().unwrap_or(self.server.http_timeout_secs);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = split_list(&v);
        }

        // Security overrides
        if let Some(v) = non_empty(lookup("SESSION_COOKIE")) {
            self.security.session_cookie = v;
        }
        if let Some(v) = lookup("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Some(v) = non_empty(lookup("ADMIN_ROLE")) {
            self.security.admin_role = v;
        }
        if let Some(v) = lookup("STUDIO_PATHS") {
            let prefixes: Vec<String> = split_list(&v)
                .into_iter()
                .map(|p| normalize_prefix(&p))
                .collect();
            if prefixes.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "STUDIO_PATHS",
                    reason: "at least one protected prefix is required".to_string(),
                });
            }
            self.security.protected_prefixes = prefixes;
        }
        if let Some(v) = non_empty(lookup("LOGIN_PATH")) {
            self.security.login_path = normalize_prefix(&v);
        }
        self.security.revalidate_secret = non_empty(lookup("REVALIDATE_SECRET"));

        // Render overrides
        if let Some(v) = non_empty(lookup("SITE_LOCALE")) {
            self.render.locale = v;
        }
        if let Some(v) = lookup("RENDER_CACHE_TTL_SECS") {
            self.render.cache_ttl_secs = v.parse().unwrap_or(self.render.cache_ttl_secs);
        }
        if let Some(v) = lookup("UNKNOWN_SECTIONS") {
            self.render.unknown_sections = match v.as_str() {
                "skip" => UnknownSectionPolicy::Skip,
                "placeholder" => UnknownSectionPolicy::Placeholder,
                other => {
                    return Err(ConfigError::Invalid {
                        name: "UNKNOWN_SECTIONS",
                        reason: format!("expected 'skip' or 'placeholder', got '{}'", other),
                    })
                }
            };
        }

        // External API overrides
        if let Some(v) = non_empty(lookup("GITHUB_API_URL")) {
            self.external.github_api = v.trim_end_matches('/').to_string();
        }
        self.external.github_username = non_empty(lookup("GITHUB_USERNAME"));
        self.external.github_token = non_empty(lookup("GITHUB_TOKEN"));

        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.server.http_timeout_secs)
    }

    fn development(cms: CmsConfig, session_secret: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                base_url: "http://localhost:3000".to_string(),
                http_timeout_secs: 10,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:3333".to_string()],
            },
            cms,
            security: SecurityConfig::defaults(session_secret, 24 * 7),
            render: RenderConfig {
                locale: "en".to_string(),
                unknown_sections: UnknownSectionPolicy::Placeholder,
                cache_ttl_secs: 5,
                cache_capacity: 256,
            },
            external: ExternalConfig::default(),
        }
    }

    fn staging(cms: CmsConfig, session_secret: String) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                base_url: "http://localhost:3000".to_string(),
                http_timeout_secs: 10,
                enable_cors: true,
                cors_origins: Vec::new(),
            },
            cms,
            security: SecurityConfig::defaults(session_secret, 24),
            render: RenderConfig {
                locale: "en".to_string(),
                unknown_sections: UnknownSectionPolicy::Skip,
                cache_ttl_secs: 60,
                cache_capacity: 1_000,
            },
            external: ExternalConfig::default(),
        }
    }

    fn production(cms: CmsConfig, session_secret: String) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                base_url: "http://localhost:3000".to_string(),
                http_timeout_secs: 10,
                enable_cors: false,
                cors_origins: Vec::new(),
            },
            cms,
            security: SecurityConfig::defaults(session_secret, 8),
            render: RenderConfig {
                locale: "en".to_string(),
                unknown_sections: UnknownSectionPolicy::Skip,
                cache_ttl_secs: 3_600,
                cache_capacity: 10_000,
            },
            external: ExternalConfig::default(),
        }
    }
}

impl CmsConfig {
    /// CMS settings alone. The `folio` CLI needs these without a session secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };
        Self::from_lookup(&|key: &str| env::var(key).ok(), environment)
    }

    fn from_lookup<F>(lookup: &F, environment: Environment) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = non_empty(lookup("SANITY_PROJECT_ID")).ok_or(ConfigError::Missing("SANITY_PROJECT_ID"))?;
        if !project_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ConfigError::Invalid {
                name: "SANITY_PROJECT_ID",
                reason: "only letters, digits and '-' are allowed".to_string(),
            });
        }

        let use_cdn = match lookup("SANITY_USE_CDN") {
            Some(v) => v.parse().unwrap_or(false),
            None => environment == Environment::Production,
        };

        Ok(Self {
            project_id,
            dataset: non_empty(lookup("SANITY_DATASET")).unwrap_or_else(|| "production".to_string()),
            api_version: non_empty(lookup("SANITY_API_VERSION"))
                .map(|v| v.trim_start_matches('v').to_string())
                .unwrap_or_else(|| "2024-01-01".to_string()),
            api_host: non_empty(lookup("SANITY_API_HOST")).map(|h| h.trim_end_matches('/').to_string()),
            use_cdn,
            token: non_empty(lookup("SANITY_API_TOKEN")),
        })
    }

    /// Base URL for reads, without the version segment.
    pub fn host(&self) -> String {
        match &self.api_host {
            Some(host) => host.clone(),
            None if self.use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => self.write_host(),
        }
    }

    /// Base URL for mutations. The CDN host is read-only.
    pub fn write_host(&self) -> String {
        match &self.api_host {
            Some(host) => host.clone(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }
}

impl SecurityConfig {
    pub(crate) fn defaults(session_secret: String, session_expiry_hours: u64) -> Self {
        Self {
            session_secret,
            session_cookie: "session_token".to_string(),
            session_expiry_hours,
            admin_role: "admin".to_string(),
            protected_prefixes: vec!["/studio".to_string()],
            login_path: "/login".to_string(),
            revalidate_secret: None,
        }
    }
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            github_username: None,
            github_token: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_prefix(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
