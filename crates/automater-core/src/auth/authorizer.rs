//! Task authorizer: gates the verified payload's `task` against the allow-list.
//!
//! Matching is exact and case-sensitive after trimming the requested task.
//! No prefix matching, no normalization of inner whitespace.

use std::collections::BTreeSet;

use automater_types::config::parse_task_list;
use automater_types::dispatch::DispatchPayload;
use automater_types::error::RequestError;
use automater_types::key::KeyId;

use super::verifier::VerifiedRequest;

/// A task that passed the allow-list for a verified request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedTask {
    task: String,
    kid: KeyId,
}

impl AuthorizedTask {
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Key-id of the request that asked for this task.
    pub fn kid(&self) -> &KeyId {
        &self.kid
    }
}

#[derive(Debug, Clone)]
pub struct TaskAuthorizer {
    allowed: BTreeSet<String>,
}

impl TaskAuthorizer {
    pub fn new<I, T>(allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Build from a comma-separated list (`"health,scan"`).
    pub fn from_csv(csv: &str) -> Self {
        Self::new(parse_task_list(csv))
    }

    pub fn authorize(
        &self,
        verified: &VerifiedRequest,
        payload: &DispatchPayload,
    ) -> Result<AuthorizedTask, RequestError> {
        let task = payload
            .task
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(RequestError::MissingTask)?;

        if !self.allowed.contains(task) {
            return Err(RequestError::TaskNotAllowed(task.to_string()));
        }

        Ok(AuthorizedTask {
            task: task.to_string(),
            kid: verified.kid().clone(),
        })
    }
}
