//! Refinement loop - state machine, code sanitizer and verdict parser

mod loop_runner;
mod sanitize;
mod verdict;

pub use loop_runner::{LoopState, RefineConfig, RefineOutcome, RefinementLoop};
pub use sanitize::sanitize_code;
pub use verdict::{VerdictParseError, parse_verdict};
