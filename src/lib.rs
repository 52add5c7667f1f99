//! # Fanout
//!
//! `fanout` is a minimalist, in-memory topic-based broadcast fan-out server
//! built with Rust. A domain event published to a named topic is delivered to
//! every live subscriber of that topic over WebSocket, in per-topic sequence
//! order.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The central component that manages topics, subscribers, sequence
//!   assignment, fan-out, and backpressure.
//! - `subscriber`: Represents a connected subscriber and its bounded outbound queue.
//! - `config`: Handles loading and managing server configuration.
//! - `transport`: Manages the WebSocket server and communication with subscribers.
//! - `utils`: Contains shared utilities, such as error types and logging setup.

pub mod broker;
pub mod config;
pub mod subscriber;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
