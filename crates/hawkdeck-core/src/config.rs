use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{DeckError, Result};

pub const TOKEN_ENV_VAR: &str = "GOOGLE_ACCESS_TOKEN";

/// Startup configuration for the deck builder. The template id is supplied
/// by the caller so the builders never bake in a document id.
#[derive(Debug, Clone)]
pub struct Config {
    /// Presentation copied as the starting point of every deck.
    pub template_presentation_id: String,
}

impl Config {
    pub fn new(template_presentation_id: impl Into<String>) -> Self {
        Config {
            template_presentation_id: template_presentation_id.into(),
        }
    }
}

/// Default location of the cached token file.
pub fn token_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hawkdeck")
        .join("token.json")
}

#[derive(Deserialize)]
struct TokenFile {
    token: String,
}

/// Resolve the bearer token for the remote session: the environment variable
/// wins, then the cached token file. Token refresh is the credential
/// provider's job, not ours.
pub fn access_token() -> Result<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.is_empty() {
            return Ok(token);
        }
    }
    let path = token_file_path();
    if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        let parsed: TokenFile = serde_json::from_str(&contents)?;
        return Ok(parsed.token);
    }
    Err(DeckError::MissingToken {
        env_var: TOKEN_ENV_VAR.to_string(),
    })
}
