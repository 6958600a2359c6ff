/// `load_config` module: reads the printroom YAML file and injects the API
/// token from the environment.
///
/// The YAML file carries no secrets. It names the dashboard backend and may
/// override any part of the physical layout table or the dispatch timings;
/// everything it leaves out keeps the core's defaults.
///
/// ```yaml
/// api:
///   base_url: https://dashboard.example/api
/// layout:
///   id_card:
///     row_shift_mm: -7.2
/// dispatch:
///   mobile_settle_ms: 300
/// ```
///
/// # Errors
/// Every failure is an `anyhow::Error` with the path and cause, surfaced at
/// the CLI boundary.
use anyhow::Result;
use printroom_core::{DispatchConfig, LayoutConfig, PrintroomConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Environment variable holding the backend bearer token.
pub const API_TOKEN_ENV: &str = "PRINTROOM_API_TOKEN";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub api: ApiSection,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    /// Read from [`API_TOKEN_ENV`], never from the file.
    #[serde(skip)]
    pub token: Option<String>,
}

impl CliConfig {
    pub fn printroom(&self) -> PrintroomConfig {
        PrintroomConfig {
            layout: self.layout.clone(),
            dispatch: self.dispatch.clone(),
        }
    }
}

/// Loads a static YAML config file and injects the API token from the
/// environment, if set.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.api.base_url.trim().is_empty() {
        error!(config_path = ?path_ref, "api.base_url is empty");
        return Err(anyhow::anyhow!("api.base_url must not be empty"));
    }

    match std::env::var(API_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => config.api.token = Some(token),
        _ => warn!(env = API_TOKEN_ENV, "No API token in environment; requests go out unauthenticated"),
    }

    config.printroom().trace_loaded();
    Ok(config)
}
