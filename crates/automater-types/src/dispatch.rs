//! Payload and outcome types for workflow dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// Typed view of the verified request body: `{task, ref?, inputs?}`.
///
/// Decoding is strict: a non-object body or a field of the wrong JSON type
/// is a [`RequestError::BadJson`], never a silent coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchPayload {
    #[serde(default)]
    pub task: Option<String>,

    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,

    #[serde(default)]
    pub inputs: Option<Map<String, Value>>,
}

impl DispatchPayload {
    /// Decode the raw body bytes.
    ///
    /// An empty or whitespace-only body decodes as `{}`.
    pub fn decode(body: &[u8]) -> Result<Self, RequestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| RequestError::BadJson(e.to_string()))?;
        if !value.is_object() {
            return Err(RequestError::BadJson("body must be a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| RequestError::BadJson(e.to_string()))
    }
}

/// Coordinates of the downstream workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTarget {
    pub owner: String,
    pub repo: String,
    /// Workflow file name or numeric id.
    pub workflow: String,
}

impl WorkflowTarget {
    /// `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// What was (or would have been) dispatched, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchContext {
    pub repo: String,
    pub workflow: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub task: String,
}

/// Successful terminal result of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The workflow dispatch call was accepted downstream.
    Dispatched(DispatchContext),
    /// Verified, but no outbound call was made (dev mode without a token).
    VerifiedOnly { reason: String },
}
