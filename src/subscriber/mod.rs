//! The `subscriber` module defines the representation of a subscriber in the
//! fan-out system.
//!
//! It provides the `Subscriber` struct, which encapsulates the state of a
//! single connected subscriber: its unique identifier, its bounded outbound
//! delivery queue, and the timestamp of its last sign of life.

pub mod handle;
pub use handle::Subscriber;

#[cfg(test)]
mod tests;
