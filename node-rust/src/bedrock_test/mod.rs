//! Test doubles for code built on [`crate::BedrockClient`].

mod transport;

pub use transport::{MockInvokeResult, MockTransport, TrackedInvocation};
