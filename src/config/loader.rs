// Configuration loader
// Loads from an explicit path, ~/.mindmitra/config.toml, or environment variables

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{Config, SupabaseConfig};
use crate::errors::{api_key_missing_error, config_parse_error};

/// Load configuration
///
/// An explicit path must exist. Otherwise ~/.mindmitra/config.toml is used
/// when present, and the process environment when not.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_from_file(path);
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            return load_from_file(&path);
        }
    }

    load_from_env(|key| std::env::var(key).ok())
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mindmitra").join("config.toml"))
}

pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!(config_parse_error(&path.display().to_string(), &e.to_string())))?;

    if config.openrouter.api_key.trim().is_empty() {
        bail!(api_key_missing_error());
    }

    Ok(config)
}

/// Build configuration from environment-style lookups
pub fn load_from_env<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let Some(api_key) = get("OPENROUTER_API_KEY") else {
        bail!(api_key_missing_error());
    };

    let mut config = Config::new(api_key);

    if let Some(model) = get("OPENROUTER_MODEL") {
        config.openrouter.model = model;
    }
    if let Some(base_url) = get("OPENROUTER_BASE_URL") {
        config.openrouter.base_url = base_url;
    }
    if let Some(frontend_url) = get("FRONTEND_URL") {
        config.openrouter.frontend_url = frontend_url;
    }
    if let Some(environment) = get("ENVIRONMENT") {
        config.environment = environment;
    }
    if let Some(bind) = get("MINDMITRA_BIND") {
        config.server.bind_address = bind;
    }
    if let Some(path) = get("MINDMITRA_CRISIS_LEXICON") {
        config.crisis.lexicon_path = Some(PathBuf::from(path));
    }

    match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_KEY")) {
        (Some(url), Some(service_key)) => {
            config.supabase = Some(SupabaseConfig { url, service_key });
        }
        (None, None) => {}
        _ => bail!("SUPABASE_URL and SUPABASE_SERVICE_KEY must be set together"),
    }

    Ok(config)
}
