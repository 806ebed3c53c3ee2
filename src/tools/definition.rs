//! Tool parameter declarations, validation and schema rendering
//!
//! A tool declares its parameters once; the same declaration drives input
//! validation (before anything is dispatched) and the function schema handed
//! to LLM APIs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{RefineError, Result};

/// JSON type a parameter must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    /// JSON Schema type keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Check a JSON value against this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn base_schema(&self) -> Value {
        match self {
            Self::Array => json!({
                "type": "array",
                "items": { "type": "string", "description": "List element" }
            }),
            other => json!({ "type": other.as_str() }),
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single declared tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: ParameterType,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    /// Inclusive lower bound for numeric parameters
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric parameters
    pub max: Option<f64>,
    /// Allowed values
    pub choices: Option<Vec<Value>>,
}

impl ToolParameter {
    /// Create a required parameter
    pub fn new(name: impl Into<String>, param_type: ParameterType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
            default: None,
            min: None,
            max: None,
            choices: None,
        }
    }

    /// Make the parameter optional with a default value
    pub fn optional(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    /// Set inclusive numeric bounds
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Restrict to a fixed set of values
    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    fn check_constraints(&self, value: &Value) -> Result<()> {
        if let Some(number) = value.as_f64() {
            if let Some(min) = self.min {
                if number < min {
                    return Err(RefineError::Validation(format!("{} must be >= {}", self.name, min)));
                }
            }
            if let Some(max) = self.max {
                if number > max {
                    return Err(RefineError::Validation(format!("{} must be <= {}", self.name, max)));
                }
            }
        }

        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                let allowed: Vec<String> = choices.iter().map(Value::to_string).collect();
                return Err(RefineError::Validation(format!(
                    "{} must be one of [{}]",
                    self.name,
                    allowed.join(", ")
                )));
            }
        }

        Ok(())
    }

    fn schema(&self) -> Value {
        let mut schema = self.param_type.base_schema();
        schema["description"] = json!(self.description);
        if let Some(min) = self.min {
            schema["minimum"] = number_json(min);
        }
        if let Some(max) = self.max {
            schema["maximum"] = number_json(max);
        }
        if let Some(choices) = &self.choices {
            schema["enum"] = json!(choices);
        }
        schema
    }
}

/// Render whole numbers without a trailing `.0`
fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// Name, description and parameters of a callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter declaration
    pub fn with_parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Validate raw input against the declared parameters.
    ///
    /// Required parameters must be present; present parameters must have the
    /// declared type and satisfy their constraints. Undeclared keys are ignored.
    pub fn validate(&self, input: &Value) -> Result<()> {
        let args = input
            .as_object()
            .ok_or_else(|| RefineError::Validation(format!("{} expects an object of parameters", self.name)))?;

        for param in &self.parameters {
            match args.get(&param.name) {
                None if param.required => {
                    return Err(RefineError::Validation(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                None => {}
                Some(value) => {
                    if !param.param_type.matches(value) {
                        return Err(RefineError::Validation(format!(
                            "Invalid type for {}. Expected: {}",
                            param.name, param.param_type
                        )));
                    }
                    param.check_constraints(value)?;
                }
            }
        }

        Ok(())
    }

    /// Look up a parameter value, falling back to its declared default
    pub fn value_or_default<'a>(&'a self, input: &'a Value, name: &str) -> Option<&'a Value> {
        input.get(name).or_else(|| {
            self.parameters
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.default.as_ref())
        })
    }

    /// Function-calling schema in the OpenAI chat-completions format
    pub fn function_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            properties.insert(param.name.clone(), param.schema());
            if param.required {
                required.push(param.name.clone());
            }
        }

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}
