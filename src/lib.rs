//! Coderefine - generate, execute and iteratively refine programs
//!
//! A generator proposes code, a process sandbox runs it under a hard deadline,
//! and an evaluator judges the output. Rejected attempts are compressed into a
//! bounded history that guides the next generation.

pub mod domain;
pub mod error;
pub mod history;
pub mod id;
pub mod llm;
pub mod oracle;
pub mod runner;
pub mod sandbox;
pub mod tools;

pub use error::{RefineError, Result};
