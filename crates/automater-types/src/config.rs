//! Process-wide configuration for the trigger service.
//!
//! `TriggerConfig` is built once at startup (defaults, then an optional
//! `config.toml`, then environment variables) and shared read-only with
//! every request. Secrets and the credential token are never part of the
//! serialized form.

use serde::{Deserialize, Serialize};

use crate::dispatch::WorkflowTarget;
use crate::secret::{Redacted, SecretSet};

/// Tasks allowed when nothing is configured.
pub const DEFAULT_ALLOWED_TASKS: &str = "scan,health,doctor,validate,plan,codex,pr";

/// Top-level configuration record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub tasks: TaskConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Relaxes only the "no token, no dispatch" case; never verification.
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on accepted request bodies.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Maximum allowed |now - timestamp| in seconds.
    #[serde(default = "default_skew_secs")]
    pub skew_secs: u64,

    /// Echo intermediate values on signature mismatch. Local testing only.
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub headers: HeaderAliases,

    /// Supplied from the environment only.
    #[serde(skip)]
    pub secrets: SecretSet,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            skew_secs: default_skew_secs(),
            debug: false,
            headers: HeaderAliases::default(),
            secrets: SecretSet::default(),
        }
    }
}

/// Accepted header names per logical field, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderAliases {
    #[serde(default = "default_kid_headers")]
    pub kid: Vec<String>,

    #[serde(default = "default_timestamp_headers")]
    pub timestamp: Vec<String>,

    #[serde(default = "default_signature_headers")]
    pub signature: Vec<String>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self {
            kid: default_kid_headers(),
            timestamp: default_timestamp_headers(),
            signature: default_signature_headers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_allowed_tasks")]
    pub allowed: Vec<String>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed_tasks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub repo: String,

    #[serde(default)]
    pub workflow: String,

    #[serde(default = "default_ref")]
    pub default_ref: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Add `kid` to the forwarded workflow inputs.
    #[serde(default)]
    pub forward_kid: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Supplied from the environment only.
    #[serde(skip)]
    pub token: Option<Redacted>,
}

impl DispatchConfig {
    /// The downstream target, if owner, repo and workflow are all set.
    pub fn target(&self) -> Option<WorkflowTarget> {
        if self.owner.is_empty() || self.repo.is_empty() || self.workflow.is_empty() {
            return None;
        }
        Some(WorkflowTarget {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            workflow: self.workflow.clone(),
        })
    }

    /// Service name reported by the health endpoint.
    pub fn service_name(&self) -> String {
        let repo = if self.repo.is_empty() { "unknown" } else { &self.repo };
        format!("{repo}-automater-trigger")
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            workflow: String::new(),
            default_ref: default_ref(),
            api_base: default_api_base(),
            api_version: default_api_version(),
            forward_kid: false,
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

/// Split a comma-separated task list, trimming entries and dropping empties.
pub fn parse_task_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_skew_secs() -> u64 {
    300
}

fn default_kid_headers() -> Vec<String> {
    vec!["X-AUTOMATE-Kid".to_string(), "X-AUTOMATER-Kid".to_string()]
}

fn default_timestamp_headers() -> Vec<String> {
    vec![
        "X-AUTOMATE-Ts".to_string(),
        "X-AUTOMATER-Ts".to_string(),
        "X-AUTOMATE-Timestamp".to_string(),
        "X-AUTOMATER-Timestamp".to_string(),
    ]
}

fn default_signature_headers() -> Vec<String> {
    vec![
        "X-AUTOMATE-Signature".to_string(),
        "X-AUTOMATER-Signature".to_string(),
    ]
}

fn default_allowed_tasks() -> Vec<String> {
    parse_task_list(DEFAULT_ALLOWED_TASKS)
}

fn default_ref() -> String {
    "master".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_api_version() -> String {
    "2022-11-28".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_config_default_values() {
        let config = TriggerConfig::default();
        assert_eq!(config.auth.skew_secs, 300);
        assert!(!config.auth.debug);
        assert!(!config.dev_mode);
        assert_eq!(config.dispatch.default_ref, "master");
        assert_eq!(config.tasks.allowed.len(), 7);
        assert!(config.dispatch.token.is_none());
        assert!(config.auth.secrets.is_empty());
    }

    #[test]
    fn test_trigger_config_deserialize_with_defaults() {
        let config: TriggerConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.auth.headers, HeaderAliases::default());
        assert_eq!(config.dispatch.api_version, "2022-11-28");
    }

    #[test]
    fn test_trigger_config_deserialize_with_values() {
        let toml_str = r#"
dev_mode = true

[auth]
skew_secs = 60

[auth.headers]
signature = ["X-Sig"]

[tasks]
allowed = ["health", "scan"]

[dispatch]
owner = "acme"
repo = "site"
workflow = "automater-dispatch.yml"
default_ref = "main"
"#;
        let config: TriggerConfig = toml::from_str(toml_str).unwrap();
        assert!(config.dev_mode);
        assert_eq!(config.auth.skew_secs, 60);
        assert_eq!(config.auth.headers.signature, vec!["X-Sig".to_string()]);
        assert_eq!(config.auth.headers.kid, default_kid_headers());
        assert_eq!(config.tasks.allowed, vec!["health", "scan"]);
        assert_eq!(config.dispatch.default_ref, "main");
        assert_eq!(config.dispatch.target().unwrap().full_name(), "acme/site");
    }

    #[test]
    fn test_target_requires_all_coordinates() {
        let mut dispatch = DispatchConfig::default();
        assert!(dispatch.target().is_none());
        dispatch.owner = "acme".into();
        dispatch.repo = "site".into();
        assert!(dispatch.target().is_none());
        dispatch.workflow = "ci.yml".into();
        assert!(dispatch.target().is_some());
    }

    #[test]
    fn test_service_name() {
        let mut dispatch = DispatchConfig::default();
        assert_eq!(dispatch.service_name(), "unknown-automater-trigger");
        dispatch.repo = "site".into();
        assert_eq!(dispatch.service_name(), "site-automater-trigger");
    }

    #[test]
    fn test_parse_task_list() {
        assert_eq!(parse_task_list(" health, scan ,,"), vec!["health", "scan"]);
        assert!(parse_task_list(" , ").is_empty());
    }
}
