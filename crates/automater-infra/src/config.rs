//! Configuration loader for the trigger service.
//!
//! Sources, lowest to highest priority:
//!
//! 1. Built-in defaults ([`TriggerConfig::default()`]).
//! 2. An optional `config.toml` (`--config` or `AUTOMATER_CONFIG`). A missing
//!    file means defaults; a file that fails to parse is a startup error.
//! 3. Environment variables. Every logical field has an ordered list of
//!    accepted names; the first non-empty (trimmed) value wins.
//!
//! Secrets and the credential token come from the environment only. The
//! loader takes the variables as an explicit map so tests never touch the
//! process environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};

use automater_types::config::{parse_task_list, TriggerConfig};
use automater_types::key::KeyId;
use automater_types::secret::{Redacted, SecretMaterial, SecretSet, SourcedSecret};

/// Environment snapshot handed to the loader.
pub type EnvVars = BTreeMap<String, String>;

pub const CONFIG_PATH_VARS: &[&str] = &["AUTOMATER_CONFIG"];
pub const PER_KEY_SECRET_PREFIXES: &[&str] = &["AUTOMATE_TRIGGER_SECRET_", "AUTOMATER_TRIGGER_SECRET_"];
pub const LEGACY_SECRET_VARS: &[&str] = &["AUTOMATE_TRIGGER_SECRET", "AUTOMATER_TRIGGER_SECRET"];
pub const SKEW_VARS: &[&str] = &["AUTOMATE_TS_SKEW_SEC", "AUTOMATER_TIME_SKEW_SEC"];
pub const ALLOWED_TASK_VARS: &[&str] = &["AUTOMATE_ALLOWED_TASK", "AUTOMATER_ALLOWED_TASK"];
pub const DEBUG_VARS: &[&str] = &["AUTOMATE_DEBUG", "AUTOMATER_DEBUG"];
pub const DEV_MODE_VARS: &[&str] = &["AUTOMATE_DEV_MODE", "AUTOMATER_DEV_MODE"];
pub const FORWARD_KID_VARS: &[&str] = &["AUTOMATE_FORWARD_KID", "AUTOMATER_FORWARD_KID"];
pub const OWNER_VARS: &[&str] = &["GH_OWNER"];
pub const REPO_VARS: &[&str] = &["GH_REPO"];
pub const WORKFLOW_VARS: &[&str] = &["GH_WORKFLOW"];
pub const REF_VARS: &[&str] = &["GH_REF"];
pub const TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];
pub const API_VERSION_VARS: &[&str] = &["GH_API_VERSION"];
pub const API_BASE_VARS: &[&str] = &["GH_API_BASE"];
pub const HOST_VARS: &[&str] = &["AUTOMATER_HOST"];
pub const PORT_VARS: &[&str] = &["AUTOMATER_PORT", "PORT"];
pub const MAX_BODY_VARS: &[&str] = &["AUTOMATER_MAX_BODY_BYTES"];
pub const TIMEOUT_VARS: &[&str] = &["AUTOMATER_DISPATCH_TIMEOUT_SEC"];

/// Snapshot of the current process environment.
pub fn process_env() -> EnvVars {
    std::env::vars().collect()
}

/// Build the effective configuration.
///
/// `path` takes precedence over `AUTOMATER_CONFIG`. The result is validated;
/// an invalid configuration is a startup error.
pub async fn load_config(path: Option<&Path>, vars: &EnvVars) -> anyhow::Result<TriggerConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| lookup(vars, CONFIG_PATH_VARS).map(|(_, value)| PathBuf::from(value)));

    let mut config = match path {
        Some(path) => read_config_file(&path).await?,
        None => TriggerConfig::default(),
    };

    apply_env(&mut config, vars);
    validate(&config)?;
    Ok(config)
}

async fn read_config_file(path: &Path) -> anyhow::Result<TriggerConfig> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(TriggerConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Overlay environment variables onto `config`.
pub fn apply_env(config: &mut TriggerConfig, vars: &EnvVars) {
    if let Some((_, host)) = lookup(vars, HOST_VARS) {
        config.server.host = host.to_string();
    }
    config.server.port = parse_or(vars, PORT_VARS, config.server.port);
    config.server.max_body_bytes = parse_or(vars, MAX_BODY_VARS, config.server.max_body_bytes);

    config.auth.skew_secs = parse_or(vars, SKEW_VARS, config.auth.skew_secs);
    config.auth.debug = flag_or(vars, DEBUG_VARS, config.auth.debug);
    config.auth.secrets = collect_secrets(vars);

    if let Some((_, csv)) = lookup(vars, ALLOWED_TASK_VARS) {
        config.tasks.allowed = parse_task_list(csv);
    }

    let dispatch = &mut config.dispatch;
    for (names, field) in [
        (OWNER_VARS, &mut dispatch.owner),
        (REPO_VARS, &mut dispatch.repo),
        (WORKFLOW_VARS, &mut dispatch.workflow),
        (REF_VARS, &mut dispatch.default_ref),
        (API_VERSION_VARS, &mut dispatch.api_version),
        (API_BASE_VARS, &mut dispatch.api_base),
    ] {
        if let Some((_, value)) = lookup(vars, names) {
            *field = value.to_string();
        }
    }
    dispatch.forward_kid = flag_or(vars, FORWARD_KID_VARS, dispatch.forward_kid);
    dispatch.timeout_secs = parse_or(vars, TIMEOUT_VARS, dispatch.timeout_secs);
    dispatch.token = lookup(vars, TOKEN_VARS).map(|(_, token)| Redacted::new(token));

    config.dev_mode = flag_or(vars, DEV_MODE_VARS, config.dev_mode);
}

/// Collect per-key and legacy secrets, recording which variable each came from.
///
/// For a given key-id the earlier prefix in [`PER_KEY_SECRET_PREFIXES`] wins.
/// Variables whose suffix is not a valid key-id are ignored with a warning.
pub fn collect_secrets(vars: &EnvVars) -> SecretSet {
    let mut set = SecretSet::default();

    for prefix in PER_KEY_SECRET_PREFIXES {
        for (name, value) in vars.range(prefix.to_string()..) {
            let Some(suffix) = name.strip_prefix(prefix) else {
                break;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let kid = match KeyId::parse(suffix) {
                Ok(kid) => kid,
                Err(_) => {
                    tracing::warn!(var = %name, "ignoring secret variable with invalid key id suffix");
                    continue;
                }
            };
            set.per_key
                .entry(kid)
                .or_insert_with(|| SourcedSecret::new(SecretMaterial::new(value), name.as_str()));
        }
    }

    set.legacy = lookup(vars, LEGACY_SECRET_VARS)
        .map(|(name, value)| SourcedSecret::new(SecretMaterial::new(value), name));

    set
}

/// Startup validation. Missing secrets or GitHub routing are not errors here;
/// they surface per request as `Misconfig`.
pub fn validate(config: &TriggerConfig) -> anyhow::Result<()> {
    ensure!(config.auth.skew_secs > 0, "clock skew must be greater than zero");
    ensure!(config.server.port > 0, "port must be greater than zero");
    ensure!(config.server.max_body_bytes > 0, "max body bytes must be greater than zero");
    ensure!(
        !config.tasks.allowed.is_empty(),
        "at least one allowed task must be configured"
    );

    let headers = &config.auth.headers;
    for (field, names) in [
        ("kid", &headers.kid),
        ("timestamp", &headers.timestamp),
        ("signature", &headers.signature),
    ] {
        ensure!(
            names.iter().any(|n| !n.trim().is_empty()),
            "header alias list for {field} must not be empty"
        );
    }

    Ok(())
}

/// First non-empty value among `names`, with the name it came from.
fn lookup<'a>(vars: &'a EnvVars, names: &[&'static str]) -> Option<(&'static str, &'a str)> {
    names.iter().find_map(|name| {
        vars.get(*name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| (*name, value))
    })
}

fn parse_or<T>(vars: &EnvVars, names: &[&'static str], current: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match lookup(vars, names) {
        Some((name, raw)) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = raw, "malformed number, keeping previous value");
            current
        }),
        None => current,
    }
}

fn flag_or(vars: &EnvVars, names: &[&'static str], current: bool) -> bool {
    match lookup(vars, names) {
        Some((_, raw)) => raw == "1",
        None => current,
    }
}
