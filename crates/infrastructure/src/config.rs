use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory the source images are written to; also served at `/uploads`.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Absolute prefix for image URLs in upload responses
    /// (e.g. "http://localhost:3000"). When unset, relative paths are returned.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            uploads_dir: default_uploads_dir(),
            public_base_url: None,
        }
    }
}

fn default_api_port() -> u16 {
    3000
}
fn default_uploads_dir() -> String {
    "uploads".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_extraction_timeout_secs")]
    pub extraction_timeout_secs: u64,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_extraction_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Layered configuration: optional file source, then environment
    /// variables (e.g. METER__GEMINI__API_KEY, METER__SERVER__API_PORT).
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(Environment::with_prefix("METER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
