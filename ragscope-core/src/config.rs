//! Configuration system for RAGScope.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/ragscope/config.toml` and/or `.ragscope/config.toml`
//! in the working directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::client::Protocol;
use crate::params::{CHUNK_OVERLAP_RANGE, CHUNK_SIZE_RANGE, Parameters, TOP_K_RANGE};

/// Origin used when nothing overrides `backend.base_url`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the debug endpoint on the backend.
pub const DEFAULT_ENDPOINT_PATH: &str = "/rag/debug";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagscopeConfig {
    pub backend: BackendConfig,
    pub defaults: DefaultsConfig,
    pub ui: UiConfig,
}

/// Where and how to reach the RAG backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend origin, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Debug endpoint path appended to `base_url`.
    pub endpoint_path: String,
    /// Request protocol: `two_phase` or `single_phase`.
    pub protocol: Protocol,
    /// Optional request timeout. When unset the HTTP client default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            protocol: Protocol::default(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Full URL of the debug endpoint, joined without doubled or missing slashes.
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.endpoint_path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// Initial slider positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub top_k: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE_RANGE.default,
            chunk_overlap: CHUNK_OVERLAP_RANGE.default,
            top_k: TOP_K_RANGE.default,
        }
    }
}

impl DefaultsConfig {
    /// Starting parameters with an empty query. Out-of-range values are clamped.
    pub fn to_parameters(&self) -> Parameters {
        Parameters::new(String::new(), self.chunk_size, self.chunk_overlap, self.top_k)
    }

    /// Return human-readable warnings for values that will be clamped.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let checks = [
            ("chunk_size", self.chunk_size, CHUNK_SIZE_RANGE),
            ("chunk_overlap", self.chunk_overlap, CHUNK_OVERLAP_RANGE),
            ("top_k", self.top_k, TOP_K_RANGE),
        ];
        for (name, value, range) in checks {
            if !range.contains(value) {
                warnings.push(format!(
                    "defaults.{} ({}) is outside {}..={} and will be clamped to {}",
                    name,
                    value,
                    range.min,
                    range.max,
                    range.clamp(value)
                ));
            }
        }
        warnings
    }
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Color theme name.
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
        }
    }
}

/// Load configuration from all sources, merging in priority order.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `RAGSCOPE_`)
/// 3. Workspace-local config (`.ragscope/config.toml`)
/// 4. User config (`~/.config/ragscope/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&figment::value::Dict>,
) -> Result<RagscopeConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(RagscopeConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "ragscope", "ragscope") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".ragscope").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // RAGSCOPE_BACKEND__BASE_URL, RAGSCOPE_BACKEND__PROTOCOL, ...
    figment = figment.merge(Env::prefixed("RAGSCOPE_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Collects CLI-level overrides as a nested figment dictionary, so only the keys the
/// user actually passed take part in the merge.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    dict: figment::value::Dict,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `section.key` to `value`.
    pub fn set(
        &mut self,
        section: &str,
        key: &str,
        value: impl Into<figment::value::Value>,
    ) -> &mut Self {
        let entry = self
            .dict
            .entry(section.to_string())
            .or_insert_with(|| {
                figment::value::Value::Dict(
                    figment::value::Tag::Default,
                    figment::value::Dict::new(),
                )
            });
        if let figment::value::Value::Dict(_, table) = entry {
            table.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn as_dict(&self) -> &figment::value::Dict {
        &self.dict
    }
}
