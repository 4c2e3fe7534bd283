//! `automater sign` -- produce the authentication headers for a body.
//!
//! The secret is read from the environment (never from argv), using the same
//! per-key / legacy resolution as the server unless `--secret-env` names a
//! specific variable.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use automater_core::auth::resolver::SecretResolver;
use automater_core::auth::signer::sign_body;
use automater_infra::config::{collect_secrets, EnvVars};
use automater_infra::crypto::signer::HmacSha256Signer;
use automater_types::config::HeaderAliases;
use automater_types::error::SignerError;
use automater_types::key::KeyId;

#[derive(Debug, Args)]
pub struct SignArgs {
    /// Key-id to sign with.
    #[arg(long, default_value = "K1")]
    pub kid: String,

    /// Read the secret from this environment variable.
    #[arg(long)]
    pub secret_env: Option<String>,

    /// Request body (exact bytes that will be sent).
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the request body from a file.
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Unix timestamp to sign (defaults to now).
    #[arg(long)]
    pub timestamp: Option<i64>,
}

/// Header name/value pairs for `body`, named after the primary header aliases.
pub fn signed_headers(
    kid: &KeyId,
    secret: &[u8],
    timestamp: i64,
    body: &[u8],
) -> Result<Vec<(String, String)>, SignerError> {
    let aliases = HeaderAliases::default();
    let signature = sign_body(&HmacSha256Signer, secret, timestamp, body)?;
    Ok(vec![
        (aliases.kid[0].clone(), kid.to_string()),
        (aliases.timestamp[0].clone(), timestamp.to_string()),
        (aliases.signature[0].clone(), signature),
    ])
}

pub async fn run(args: SignArgs, vars: &EnvVars, json: bool) -> anyhow::Result<()> {
    let kid = KeyId::parse(&args.kid).map_err(|e| anyhow::anyhow!(e))?;

    let body = match (&args.body, &args.body_file) {
        (Some(body), _) => body.clone().into_bytes(),
        (None, Some(path)) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => Vec::new(),
    };

    let secret = match &args.secret_env {
        Some(name) => match vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(value) => value.as_bytes().to_vec(),
            None => bail!("environment variable {name} is not set"),
        },
        None => {
            let resolver = SecretResolver::new(collect_secrets(vars));
            let resolved = resolver
                .resolve(&kid)
                .map_err(|_| anyhow::anyhow!("no secret configured for {kid}"))?;
            tracing::debug!(source = resolved.source, "signing with configured secret");
            resolved.material.expose().to_vec()
        }
    };

    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp());
    let headers = signed_headers(&kid, &secret, timestamp, &body)?;

    if json {
        let map: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, value) in &headers {
            println!("{}: {}", console::style(name).bold(), value);
        }
    }

    Ok(())
}
