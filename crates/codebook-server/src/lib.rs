//! Server assembly for Codebook: configuration, HTTP layers and demo data.
//!
//! The binary in `main.rs` is a thin shell around these pieces so they can be
//! exercised in tests without binding a socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, http::HeaderValue};
use codebook_core::store::CodebookStore;
use serde::Deserialize;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CODEBOOK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Origins allowed to call the API from a browser. `"*"` allows any.
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("codebook.db") }

fn default_cors_origins() -> Vec<String> { vec!["http://localhost:5173".to_string()] }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `CODEBOOK_*` environment
  /// variables. `CODEBOOK_CORS_ORIGINS` is a comma-separated list.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("CODEBOOK")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router wrapped in CORS and request tracing.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: CodebookStore + 'static,
{
  codebook_api::api_router(store)
    .layer(cors_layer(&config.cors_origins))
    .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  if origins.iter().any(|o| o == "*") {
    return CorsLayer::permissive();
  }

  // Browsers send `Origin` without a trailing slash.
  let allowed: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match HeaderValue::from_str(o.trim_end_matches('/')) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(allowed))
    .allow_methods(Any)
    .allow_headers(Any)
}

// ─── Demo data ────────────────────────────────────────────────────────────────

pub const DEMO_MESSAGES: [&str; 2] =
  ["What's on your mind?", "I'm so scared for tonight"];

/// Insert [`DEMO_MESSAGES`] into an empty store. Returns how many messages
/// were inserted; a store that already has messages is left alone.
pub async fn seed_demo<S: CodebookStore>(store: &S) -> Result<usize, S::Error> {
  if store.count_messages().await? > 0 {
    return Ok(0);
  }
  for content in DEMO_MESSAGES {
    store.create_message(content.to_owned()).await?;
  }
  Ok(DEMO_MESSAGES.len())
}

// ─── Integration tests ────────────────────────────────────────────────────────
