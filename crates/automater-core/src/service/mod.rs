//! Use cases built on the authentication pipeline and the dispatch port.
//!
//! Services depend on traits (`MessageSigner`, `WorkflowDispatcher`), never
//! on concrete infrastructure.

pub mod trigger;
