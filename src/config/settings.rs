// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::providers::openrouter::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as HTTP-Referer; also the primary CORS origin
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    #[serde(default = "default_classification_timeout")]
    pub classification_timeout_secs: u64,
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            frontend_url: default_frontend_url(),
            generation_timeout_secs: default_generation_timeout(),
            classification_timeout_secs: default_classification_timeout(),
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn classification_timeout(&self) -> Duration {
        Duration::from_secs(self.classification_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Extra CORS origins beyond the frontend URL and local dev ports
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrisisConfig {
    /// JSON file replacing the built-in lexicon
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// Require phrases to sit on word boundaries
    #[serde(default)]
    pub word_boundary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_environment")]
    pub environment: String,

    pub openrouter: OpenRouterConfig,

    /// Without Supabase, conversations live in memory only
    #[serde(default)]
    pub supabase: Option<SupabaseConfig>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub crisis: CrisisConfig,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            environment: default_environment(),
            openrouter: OpenRouterConfig::new(api_key),
            supabase: None,
            server: ServerConfig::default(),
            crisis: CrisisConfig::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Frontend URL, local dev ports and configured extras, deduplicated
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![
            self.openrouter.frontend_url.clone(),
            "http://localhost:3000".to_string(),
            "http://localhost:3001".to_string(),
        ];
        origins.extend(self.server.allowed_origins.iter().cloned());

        let mut seen = std::collections::HashSet::new();
        origins.retain(|o| seen.insert(o.clone()));
        origins
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_frontend_url() -> String {
    DEFAULT_FRONTEND_URL.to_string()
}

fn default_generation_timeout() -> u64 {
    30
}

fn default_classification_timeout() -> u64 {
    10
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}
