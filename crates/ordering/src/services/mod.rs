//! External service traits and in-memory implementations.

pub mod submission;

pub use submission::{
    DEFAULT_LATENCY, OrderSubmissionService, REJECTION_REASON, SimulatedSubmissionService,
};
