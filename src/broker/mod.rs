pub mod engine;
pub mod event;
pub mod queue;
pub mod topic;

pub use engine::Broker;
