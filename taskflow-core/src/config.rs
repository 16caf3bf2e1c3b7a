use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state_machine::{ConfigurationError, StatusTransitionPolicy, TransitionTable};
use crate::types::{BuiltinStatus, KnownStatuses, StatusName};

// ─── Config Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_status: Option<StatusName>,
    pub statuses: Vec<StatusName>,
    #[serde(default)]
    pub transitions: TransitionTable,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            default_status: Some(BuiltinStatus::New.into()),
            statuses: BuiltinStatus::ALL.into_iter().map(StatusName::from).collect(),
            transitions: TransitionTable::builtin(),
        }
    }
}

impl WorkflowConfig {
    pub fn known_statuses(&self) -> KnownStatuses {
        self.statuses.iter().cloned().collect()
    }

    /// Validates the table against `statuses` and builds the policy.
    pub fn build_policy(&self) -> Result<StatusTransitionPolicy, ConfigurationError> {
        let known = self.known_statuses();
        if let Some(default) = &self.default_status {
            if !known.contains(default.as_str()) {
                return Err(ConfigurationError::UnknownDefault {
                    status: default.clone(),
                });
            }
        }
        let policy = StatusTransitionPolicy::new(self.transitions.clone(), known)?;
        tracing::info!(
            statuses = policy.known_statuses().len(),
            transitions = policy.table().edge_count(),
            "built status transition policy"
        );
        Ok(policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

// ─── Config Format ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Environment Variable Interpolation ──────────────────────────────────────

/// Replace `${VAR_NAME}` patterns with environment variable values.
/// Unset variables are left as-is.
pub fn interpolate_env_vars(value: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("invalid regex");
    re.replace_all(value, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

fn interpolate_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(interpolate_env_vars(&s)),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(interpolate_value).collect())
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (interpolate_env_vars(&k), interpolate_value(v)))
                .collect(),
        ),
        other => other,
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a workflow config with environment variable interpolation.
///
/// - **YAML**: interpolation runs on the raw text before parsing.
/// - **JSON**: the text is parsed first, then string keys and values are interpolated.
///
/// Empty YAML yields the default workflow.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<WorkflowConfig, ConfigError> {
    match format {
        ConfigFormat::Json => {
            let raw: serde_json::Value = serde_json::from_str(content)?;
            Ok(serde_json::from_value(interpolate_value(raw))?)
        }
        ConfigFormat::Yaml => {
            let interpolated = interpolate_env_vars(content);
            let parsed: serde_yaml::Value = serde_yaml::from_str(&interpolated)?;
            if parsed.is_null() {
                return Ok(WorkflowConfig::default());
            }
            Ok(serde_yaml::from_value(parsed)?)
        }
    }
}

// ─── File Loading ────────────────────────────────────────────────────────────

const DEFAULT_CANDIDATES: &[&str] = &[
    "taskflow.config.yaml",
    "taskflow.config.yml",
    "taskflow.config.json",
];

/// Load a workflow config. An explicit `config_path` must exist; otherwise the
/// default candidates are tried in the current directory, falling back to the
/// builtin workflow.
pub fn load_config_file(config_path: Option<&str>) -> Result<WorkflowConfig, ConfigError> {
    let base_dir = std::env::current_dir()?;
    load_config_file_from_dir(config_path, &base_dir)
}

fn load_config_file_from_dir(
    config_path: Option<&str>,
    base_dir: &Path,
) -> Result<WorkflowConfig, ConfigError> {
    if let Some(path) = config_path {
        return read_config(&resolve(path, base_dir));
    }

    for candidate in DEFAULT_CANDIDATES {
        let full_path = base_dir.join(candidate);
        if full_path.exists() {
            return read_config(&full_path);
        }
    }

    tracing::debug!("no workflow config found, using builtin workflow");
    Ok(WorkflowConfig::default())
}

fn resolve(path: &str, base_dir: &Path) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        base_dir.join(path)
    }
}

fn read_config(path: &Path) -> Result<WorkflowConfig, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let format = if ext == "json" {
        ConfigFormat::Json
    } else {
        ConfigFormat::Yaml
    };

    tracing::debug!(path = %path.display(), ?format, "loading workflow config");
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, format)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
