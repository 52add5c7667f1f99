//! The `error` module defines custom error types used within the `fanout`
//! application.
//!
//! This module centralizes error handling, providing a consistent way to
//! represent and propagate errors throughout the system.

use thiserror::Error;

/// Errors returned by `Broker::publish`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The topic does not exist and lazy topic creation is disabled.
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),
}
