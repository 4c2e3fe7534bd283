//! `automater config` -- print the effective configuration for operators.
//!
//! Secret values never appear: per-key secrets are listed by key-id and
//! source variable, and the token is masked.

use serde::Serialize;

use automater_types::config::TriggerConfig;

#[derive(Debug, Serialize)]
pub struct SecretSummary {
    pub kid: String,
    pub source: String,
}

/// Redacted view of a [`TriggerConfig`].
#[derive(Debug, Serialize)]
pub struct ConfigReport<'a> {
    #[serde(flatten)]
    pub config: &'a TriggerConfig,
    pub secrets: Vec<SecretSummary>,
    pub legacy_secret: Option<String>,
    pub token: Option<String>,
    pub target: Option<String>,
}

impl<'a> ConfigReport<'a> {
    pub fn new(config: &'a TriggerConfig) -> Self {
        let secrets = &config.auth.secrets;
        Self {
            config,
            secrets: secrets
                .per_key
                .iter()
                .map(|(kid, entry)| SecretSummary {
                    kid: kid.to_string(),
                    source: entry.source.clone(),
                })
                .collect(),
            legacy_secret: secrets.legacy.as_ref().map(|entry| entry.source.clone()),
            token: config.dispatch.token.as_ref().map(|token| token.masked()),
            target: config.dispatch.target().map(|t| format!("{}:{}", t.full_name(), t.workflow)),
        }
    }
}

pub fn show(config: &TriggerConfig, json: bool) -> anyhow::Result<()> {
    let report = ConfigReport::new(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let none = || console::style("(not set)").dim().to_string();

    println!();
    println!("  {}", console::style("Effective configuration").bold());
    println!();
    println!("  listen       {}:{}", config.server.host, config.server.port);
    println!("  max body     {} bytes", config.server.max_body_bytes);
    println!("  skew         {}s", config.auth.skew_secs);
    println!("  tasks        {}", config.tasks.allowed.join(", "));
    println!(
        "  target       {}",
        report.target.clone().unwrap_or_else(none)
    );
    println!("  default ref  {}", config.dispatch.default_ref);
    println!("  api          {} ({})", config.dispatch.api_base, config.dispatch.api_version);
    println!("  token        {}", report.token.clone().unwrap_or_else(none));
    println!();

    if report.secrets.is_empty() && report.legacy_secret.is_none() {
        println!("  {} no verification secrets configured", console::style("!").yellow());
    }
    for secret in &report.secrets {
        println!("  {} {} <- {}", console::style("✓").green(), secret.kid, secret.source);
    }
    if let Some(source) = &report.legacy_secret {
        println!("  {} legacy <- {}", console::style("✓").green(), source);
    }

    let flag = |on: bool| if on { console::style("on").yellow() } else { console::style("off").dim() };
    println!();
    println!("  dev mode     {}", flag(config.dev_mode));
    println!("  debug        {}", flag(config.auth.debug));
    println!("  forward kid  {}", flag(config.dispatch.forward_kid));
    println!();

    Ok(())
}
