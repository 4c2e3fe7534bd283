//! GitHub Actions adapter for the `WorkflowDispatcher` port.

pub mod client;

pub use client::GithubDispatcher;
