//! Pipeline-level error types.

use clients::ClientError;
use thiserror::Error;

/// Failure while locating, creating, attaching, or updating a memory block.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("memory block operation failed: {0}")]
    Client(#[from] ClientError),
}

/// Failure while parsing a webhook request before the pipeline can run: never reaches the
/// external services and is reported to the caller as a 400, not swallowed into the response
/// body the way per-step failures are. A missing or malformed-shape agent id is *not* one of
/// these — it is treated as "agent id absent" and the pipeline runs to completion with
/// agent-scoped steps skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
}
