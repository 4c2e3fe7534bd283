//! Test doubles shared by the unit tests of this crate.

use std::sync::Mutex;

use automater_types::error::{DispatchError, SignerError};

use crate::auth::signer::MessageSigner;
use crate::dispatch::{DispatchRequest, WorkflowDispatcher};

/// FNV-1a based stand-in for the real digest and MAC primitives. Any
/// single-byte change in the input changes the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeSigner;

fn fnv1a(parts: &[&[u8]]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for part in parts {
        for byte in *part {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
    }
    hash
}

impl MessageSigner for FakeSigner {
    fn digest_hex(&self, data: &[u8]) -> String {
        format!("{:016x}", fnv1a(&[data]))
    }

    fn mac_hex(&self, secret: &[u8], message: &[u8]) -> Result<String, SignerError> {
        Ok(format!("{:016x}", fnv1a(&[secret, b"|", message])))
    }
}

/// Records every dispatch and answers with a canned result.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub calls: Mutex<Vec<DispatchRequest>>,
    pub reject_with: Option<u16>,
}

impl RecordingDispatcher {
    pub fn rejecting(status: u16) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl WorkflowDispatcher for RecordingDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(request.clone());
        match self.reject_with {
            Some(status) => Err(DispatchError::Rejected {
                status,
                body: "{\"message\":\"No ref found\"}".to_string(),
            }),
            None => Ok(()),
        }
    }
}
