//! Tool System - parameter declarations, validation and the sandbox tool
//!
//! Tools validate their raw JSON input before doing any work, so malformed or
//! out-of-range parameters surface as `RefineError::Validation` and nothing
//! is launched.

mod definition;
mod execute_python;

pub use definition::{ParameterType, ToolParameter, ToolSpec};
pub use execute_python::{EXECUTE_PYTHON, ExecutePythonTool, ExecutionRequest, result_to_json};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A callable tool with declared parameters
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declared name, description and parameters
    fn spec(&self) -> &ToolSpec;

    /// Validate `input` and run the tool
    async fn invoke(&self, input: Value) -> Result<Value>;
}
