//! Request authentication: headers -> secret -> signature -> task.

pub mod authorizer;
pub mod headers;
pub mod resolver;
pub mod signer;
pub mod verifier;
