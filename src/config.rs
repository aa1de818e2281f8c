use std::env;
use std::path::PathBuf;

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub app_id: String,
    pub app_secret: String,
    pub cors_origin: String,
    pub data_dir: PathBuf,
    pub public_base_url: Option<String>,
    pub graph_api_version: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };

        Ok(Self {
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            app_id: required("META_APP_ID")?,
            app_secret: required("META_APP_SECRET")?,
            cors_origin: var("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            public_base_url: var("PUBLIC_BASE_URL").map(|v| v.trim_end_matches('/').to_string()),
            graph_api_version: var("GRAPH_API_VERSION").unwrap_or_else(|| "v19.0".to_string()),
        })
    }
}
