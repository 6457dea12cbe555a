use anyhow::Context;
use rivalwatch_storage::IntelStore;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the config file when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config/server.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// CORS 允许的 origins 列表（仅作用于 JSON API），为空时允许所有来源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            cors_allowed_origins: Vec::new(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            enrichment: EnrichmentConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. Falls back to a SQLite file inside `data_dir`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => IntelStore::sqlite_url(Path::new(&self.data_dir)),
        }
    }

    /// Connection URL with any `user:password@` part masked, for logging.
    pub fn redacted_url(&self) -> String {
        let url = self.connection_url();
        let Some(scheme_end) = url.find("://") else {
            return url;
        };
        let rest = &url[scheme_end + 3..];
        match rest.find('@') {
            Some(at) => format!("{}://***@{}", &url[..scheme_end], &rest[at + 1..]),
            None => url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session signing key. A random key is generated when unset.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Mark the session cookie `Secure` (enable behind HTTPS).
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            session_ttl_secs: default_session_ttl_secs(),
            cookie_secure: false,
        }
    }
}

fn default_session_ttl_secs() -> u64 {
    7 * 86400
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Without a key the provider is never called.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_enrichment_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: default_enrichment_timeout_secs(),
            similar_limit: default_similar_limit(),
        }
    }
}

fn default_enrichment_timeout_secs() -> u64 {
    30
}

fn default_similar_limit() -> usize {
    rivalwatch_enrich::SIMILAR_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Without a key every summary falls back to placeholder text.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_ai_model(),
            timeout_secs: default_ai_timeout_secs(),
            max_tokens: None,
            temperature: None,
        }
    }
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    120
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{path}'"))?;
        Ok(config)
    }

    /// Loads `path` when given (it must exist), otherwise the default path
    /// if present, otherwise built-in defaults. Environment overrides are
    /// applied last.
    pub fn resolve(path: Option<&str>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overrides settings from `DATABASE_URL`, `SECRET_KEY`,
    /// `COMPANY_ENRICH_API_KEY`, `OPENAI_API_KEY` and `HTTP_PORT`.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_blank(lookup("DATABASE_URL")) {
            self.database.url = Some(url);
        }
        if let Some(secret) = non_blank(lookup("SECRET_KEY")) {
            self.auth.secret_key = Some(secret);
        }
        if let Some(key) = non_blank(lookup("COMPANY_ENRICH_API_KEY")) {
            self.enrichment.api_key = Some(key);
        }
        if let Some(key) = non_blank(lookup("OPENAI_API_KEY")) {
            self.ai.api_key = Some(key);
        }
        if let Some(port) = non_blank(lookup("HTTP_PORT")) {
            self.http_port = port
                .parse()
                .with_context(|| format!("Invalid HTTP_PORT '{port}'"))?;
        }
        Ok(())
    }

    pub fn enrichment_enabled(&self) -> bool {
        self.enrichment
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
