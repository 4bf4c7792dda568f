// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{default_config_path, load_config, load_from_env, load_from_file};
pub use settings::{
    Config, CrisisConfig, OpenRouterConfig, ServerConfig, SupabaseConfig, DEFAULT_BIND_ADDRESS,
    DEFAULT_FRONTEND_URL,
};
