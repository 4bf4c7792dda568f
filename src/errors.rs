// User-friendly error messages
//
// Helpers that turn startup failures into messages telling the operator
// what to fix. Request-time failures never reach these; the pipeline
// degrades to fallback replies instead.

use anyhow::{Context, Result};

/// Wrap an error with user-friendly context
pub trait UserFriendlyError {
    /// Add user-friendly context to this error
    fn user_context(self, message: &str) -> Self;
}

impl<T> UserFriendlyError for Result<T> {
    fn user_context(self, message: &str) -> Self {
        self.with_context(|| message.to_string())
    }
}

/// No OpenRouter key in the config file or environment
pub fn api_key_missing_error() -> String {
    "OpenRouter API key is missing\n\n\
    \x1b[1;32mTry:\x1b[0m\n\
    1. Export it for this shell:\n\
       \x1b[36mexport OPENROUTER_API_KEY=sk-or-...\x1b[0m\n\n\
    2. Or add it to the config file:\n\
       \x1b[36m~/.mindmitra/config.toml\x1b[0m\n\
       [openrouter]\n\
       api_key = \"sk-or-...\""
        .to_string()
}

/// Config file exists but is not valid TOML for this service
pub fn config_parse_error(path: &str, details: &str) -> String {
    format!(
        "Could not parse config file {}\n\n\
        \x1b[1;33mDetails:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check the [openrouter] section has an api_key\n\
        2. Validate the TOML syntax:\n\
           \x1b[36mcat {}\x1b[0m\n\
        3. Move the file aside to fall back to environment variables",
        path, details, path
    )
}

/// Server could not bind its listening socket
pub fn bind_failed_error(address: &str) -> String {
    format!(
        "Could not listen on {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Another process already uses the port\n\
        • The address is not valid for this host\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Pick another address:\n\
           \x1b[36mmindmitra serve --bind 127.0.0.1:8001\x1b[0m\n\
        2. Find what holds the port:\n\
           \x1b[36mlsof -i :{}\x1b[0m",
        address,
        address.rsplit(':').next().unwrap_or(address)
    )
}

/// Crisis lexicon override could not be loaded
pub fn lexicon_load_error(path: &str) -> String {
    format!(
        "Could not load crisis lexicon from {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check the file is JSON with a non-empty \"phrases\" array\n\
        2. Remove crisis.lexicon_path to use the built-in lexicon",
        path
    )
}
