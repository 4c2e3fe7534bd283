//! The trigger pipeline: verify, authorize, dispatch.
//!
//! `TriggerService` is built once from the process-wide [`TriggerConfig`] and
//! shared read-only by every request. It holds no mutable state; each call to
//! [`TriggerService::handle`] is independent.
//!
//! Order of checks (first failure wins, no outbound call on any failure):
//! key-id format, secret resolution, timestamp, signature, body decoding,
//! task allow-list, downstream routing, credential / dev mode.

use automater_types::config::TriggerConfig;
use automater_types::dispatch::{DispatchOutcome, DispatchPayload, WorkflowTarget};
use automater_types::error::{AuthError, DispatchError, TriggerError};
use automater_types::key::KeyId;
use automater_types::request::RequestEnvelope;

use crate::auth::authorizer::TaskAuthorizer;
use crate::auth::headers::HeaderExtractor;
use crate::auth::resolver::SecretResolver;
use crate::auth::signer::MessageSigner;
use crate::auth::verifier::{SignatureVerifier, VerifiedRequest};
use crate::dispatch::{DispatchRequest, WorkflowDispatcher};

/// Reason reported when a request is verified but deliberately not forwarded.
pub const DEV_MODE_REASON: &str = "dev mode enabled and no GH_TOKEN configured";

pub struct TriggerService<S, D> {
    extractor: HeaderExtractor,
    resolver: SecretResolver,
    verifier: SignatureVerifier<S>,
    authorizer: TaskAuthorizer,
    target: Option<WorkflowTarget>,
    default_ref: String,
    forward_kid: bool,
    dev_mode: bool,
    /// `None` when no credential token is configured.
    dispatcher: Option<D>,
}

impl<S, D> TriggerService<S, D>
where
    S: MessageSigner,
    D: WorkflowDispatcher,
{
    pub fn new(config: &TriggerConfig, signer: S, dispatcher: Option<D>) -> Self {
        Self {
            extractor: HeaderExtractor::new(config.auth.headers.clone()),
            resolver: SecretResolver::new(config.auth.secrets.clone()),
            verifier: SignatureVerifier::new(signer, config.auth.skew_secs)
                .with_debug(config.auth.debug),
            authorizer: TaskAuthorizer::new(&config.tasks.allowed),
            target: config.dispatch.target(),
            default_ref: config.dispatch.default_ref.clone(),
            forward_kid: config.dispatch.forward_kid,
            dev_mode: config.dev_mode,
            dispatcher,
        }
    }

    /// Build the request envelope from raw body bytes and a header lookup.
    pub fn envelope<'a, F>(
        &self,
        body: impl Into<Vec<u8>>,
        lookup: F,
    ) -> Result<RequestEnvelope, AuthError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let headers = self.extractor.extract(lookup)?;
        Ok(RequestEnvelope::new(body, headers))
    }

    /// Authenticate one request: key-id, secret, timestamp window, signature.
    pub fn verify(
        &self,
        envelope: &RequestEnvelope,
        now: i64,
    ) -> Result<VerifiedRequest, AuthError> {
        let headers = envelope.headers();
        let kid = KeyId::parse(&headers.kid)?;
        let secret = self.resolver.resolve(&kid)?;
        self.verifier
            .verify(envelope.body(), &headers.timestamp, &headers.signature, secret, now)
    }

    /// Run the whole pipeline for one request at time `now` (unix seconds).
    pub async fn handle(
        &self,
        envelope: &RequestEnvelope,
        now: i64,
    ) -> Result<DispatchOutcome, TriggerError> {
        let verified = self.verify(envelope, now)?;
        tracing::Span::current().record("kid", verified.kid().as_str());

        let payload = DispatchPayload::decode(envelope.body())?;
        let authorized = self.authorizer.authorize(&verified, &payload)?;
        tracing::Span::current().record("task", authorized.task());

        let Some(target) = &self.target else {
            return Err(DispatchError::Misconfig(
                "GH_OWNER/GH_REPO/GH_WORKFLOW must be set".to_string(),
            )
            .into());
        };

        let Some(dispatcher) = &self.dispatcher else {
            if self.dev_mode {
                tracing::info!(task = authorized.task(), "verified, dispatch skipped (dev mode)");
                return Ok(DispatchOutcome::VerifiedOnly {
                    reason: DEV_MODE_REASON.to_string(),
                });
            }
            return Err(DispatchError::Misconfig("GH_TOKEN must be set".to_string()).into());
        };

        let request = DispatchRequest::new(
            target.clone(),
            authorized,
            payload,
            &self.default_ref,
            self.forward_kid,
        );

        match dispatcher.dispatch(&request).await {
            Ok(()) => {
                tracing::info!(
                    repo = %request.target().full_name(),
                    git_ref = request.git_ref(),
                    task = request.task(),
                    "workflow dispatched"
                );
                Ok(DispatchOutcome::Dispatched(request.context()))
            }
            Err(error) => {
                tracing::warn!(error = %error, task = request.task(), "workflow dispatch failed");
                Err(TriggerError::Dispatch {
                    error,
                    context: Some(request.context()),
                })
            }
        }
    }
}
