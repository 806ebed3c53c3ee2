//! Domain types for coderefine
//!
//! - ExecutionResult: captured outcome of one sandboxed run
//! - Attempt: one generate/execute/evaluate cycle
//! - Feedback: structured evaluator verdict
//! - TimeoutSecs: validated execution deadline

pub mod attempt;
pub mod execution;
pub mod feedback;
pub mod timeout;

pub use attempt::Attempt;
pub use execution::{ExecutionResult, NO_EXIT_CODE};
pub use feedback::{Feedback, ParseFailurePolicy};
pub use timeout::TimeoutSecs;
