//! Dispatch request construction and the `WorkflowDispatcher` port.
//!
//! A [`DispatchRequest`] can only be built from an [`AuthorizedTask`], which
//! in turn only exists for a verified request. The HTTP adapter that actually
//! talks to the workflow API lives in automater-infra.

use automater_types::dispatch::{DispatchContext, DispatchPayload, WorkflowTarget};
use automater_types::error::DispatchError;
use serde_json::{json, Map, Value};

use crate::auth::authorizer::AuthorizedTask;

/// Upper bound on downstream response text echoed back to the caller.
pub const MAX_DOWNSTREAM_BODY_CHARS: usize = 2000;

/// One outbound workflow-dispatch call, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    target: WorkflowTarget,
    git_ref: String,
    task: String,
    inputs: Map<String, Value>,
}

impl DispatchRequest {
    /// Merge the authorized task (and optionally the key-id) into the caller's
    /// inputs. `ref` is trimmed; an absent or blank ref uses `default_ref`.
    pub fn new(
        target: WorkflowTarget,
        authorized: AuthorizedTask,
        payload: DispatchPayload,
        default_ref: &str,
        forward_kid: bool,
    ) -> Self {
        let git_ref = payload
            .git_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(default_ref)
            .to_string();

        let mut inputs = payload.inputs.unwrap_or_default();
        inputs.insert("task".to_string(), Value::String(authorized.task().to_string()));
        if forward_kid {
            inputs.insert(
                "kid".to_string(),
                Value::String(authorized.kid().as_str().to_string()),
            );
        }

        Self {
            target,
            git_ref,
            task: authorized.task().to_string(),
            inputs,
        }
    }

    pub fn target(&self) -> &WorkflowTarget {
        &self.target
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }

    /// JSON body of the dispatch call: `{ref, inputs}`.
    pub fn body(&self) -> Value {
        json!({
            "ref": self.git_ref,
            "inputs": self.inputs,
        })
    }

    /// Summary echoed in responses.
    pub fn context(&self) -> DispatchContext {
        DispatchContext {
            repo: self.target.full_name(),
            workflow: self.target.workflow.clone(),
            git_ref: self.git_ref.clone(),
            task: self.task.clone(),
        }
    }
}

/// Port for the downstream workflow system.
///
/// Implementations send exactly one call per invocation and never retry.
/// Success means the downstream accepted the dispatch (no-content status).
pub trait WorkflowDispatcher: Send + Sync {
    fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> impl std::future::Future<Output = Result<(), DispatchError>> + Send;
}

/// Keep at most [`MAX_DOWNSTREAM_BODY_CHARS`] characters of a downstream body.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_DOWNSTREAM_BODY_CHARS) {
        Some((cut, _)) => body[..cut].to_string(),
        None => body.to_string(),
    }
}
