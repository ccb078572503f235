//! Configuration loading for FloatPoint.
//! Reads floatpoint.toml from the current directory or the path in FLOATPOINT_CONFIG.
//! Environment variables fill in secrets and override the bind address.

use anyhow::Context;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "0.0.0.0:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_space_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_nlp_endpoint")]
    pub nlp_endpoint: String,
    #[serde(default = "default_bgc_endpoint")]
    pub bgc_endpoint: String,
    #[serde(default = "default_spatial_endpoint")]
    pub spatial_endpoint: String,
    #[serde(default = "bool_true")]
    pub strip_summary_suffix: bool,
    /// Hugging Face token for private spaces.
    #[serde(default, deserialize_with = "secret")]
    pub api_token: Option<SecretString>,
}

fn default_space_url()        -> String { "https://armanpyro-floatpoint.hf.space".to_string() }
fn default_timeout_secs()     -> u64    { 60 }
fn default_nlp_endpoint()     -> String { "process_nlp_query".to_string() }
fn default_bgc_endpoint()     -> String { "predict_bgc".to_string() }
fn default_spatial_endpoint() -> String { "predict_spatial_temporal".to_string() }
fn bool_true()                -> bool   { true }

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_space_url(),
            timeout_secs: default_timeout_secs(),
            nlp_endpoint: default_nlp_endpoint(),
            bgc_endpoint: default_bgc_endpoint(),
            spatial_endpoint: default_spatial_endpoint(),
            strip_summary_suffix: true,
            api_token: None,
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    #[serde(default, deserialize_with = "secret")]
    pub anon_key: Option<SecretString>,
    #[serde(default, deserialize_with = "secret")]
    pub service_role_key: Option<SecretString>,
    #[serde(default = "default_predictions_table")]
    pub predictions_table: String,
    #[serde(default = "default_queries_table")]
    pub queries_table: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Upper bound on one token lookup; slower callers are served anonymously.
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
}

/// Empty strings count as unset so the environment can fill them in.
fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

fn default_predictions_table() -> String { "predictions".to_string() }
fn default_queries_table()     -> String { "queries".to_string() }
fn default_history_limit()     -> usize  { 50 }
fn default_auth_timeout_secs() -> u64    { 5 }

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            service_role_key: None,
            predictions_table: default_predictions_table(),
            queries_table: default_queries_table(),
            history_limit: default_history_limit(),
            auth_timeout_secs: default_auth_timeout_secs(),
        }
    }
}

impl SupabaseConfig {
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs.max(1))
    }
}


impl Config {
    /// Load configuration from floatpoint.toml.
    /// Checks FLOATPOINT_CONFIG env var first, then current directory.
    /// A missing file falls back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("FLOATPOINT_CONFIG")
            .unwrap_or_else(|_| "floatpoint.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))?;
            Self::from_toml_str(&content).with_context(|| format!("parsing {path}"))?
        } else {
            tracing::warn!("Config file not found: {path}; using defaults");
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Environment wins for the bind address and space URL; secrets are only
    /// taken from the environment when the file leaves them empty.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).filter(|v| !v.is_empty());

        if let Some(bind) = var("FLOATPOINT_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = var("FLOATPOINT_SPACE_URL") {
            self.inference.base_url = url;
        }
        if self.inference.api_token.is_none() {
            self.inference.api_token = var("FLOATPOINT_HF_TOKEN").map(SecretString::from);
        }
        if self.supabase.url.is_none() {
            self.supabase.url = var("FLOATPOINT_SUPABASE_URL");
        }
        if self.supabase.anon_key.is_none() {
            self.supabase.anon_key = var("FLOATPOINT_SUPABASE_ANON_KEY").map(SecretString::from);
        }
        if self.supabase.service_role_key.is_none() {
            self.supabase.service_role_key =
                var("FLOATPOINT_SUPABASE_SERVICE_ROLE_KEY").map(SecretString::from);
        }
    }
}
