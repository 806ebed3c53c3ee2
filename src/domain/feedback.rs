//! Structured verdict produced by the evaluator.
//!
//! The wire shape mirrors what evaluators are asked to emit:
//!
//! ```json
//! {
//!   "success": false,
//!   "feedback": {
//!     "technical_analysis": "...",
//!     "failure_points": ["..."],
//!     "suggestions": ["..."],
//!     "performance_notes": "...",
//!     "edge_cases": ["..."]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// What to do when an evaluator answer cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailurePolicy {
    /// Treat the attempt as accepted and stop the loop.
    ///
    /// This is a deliberate leniency: a malformed verdict ends the run with
    /// the current code rather than burning every remaining attempt on what
    /// is usually an evaluator formatting problem. Callers that need strict
    /// acceptance should select `TreatAsFailure`.
    #[default]
    AcceptAsSuccess,
    /// Treat the attempt as rejected and keep iterating.
    TreatAsFailure,
}

/// Evaluator verdict for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FeedbackWire", into = "FeedbackWire")]
pub struct Feedback {
    pub success: bool,
    pub analysis: String,
    pub failure_points: Vec<String>,
    pub suggestions: Vec<String>,
    pub performance_notes: String,
    pub edge_cases: Vec<String>,
}

impl Feedback {
    /// Feedback accepting the attempt with no further notes.
    pub fn accepted(analysis: impl Into<String>) -> Self {
        Self {
            success: true,
            analysis: analysis.into(),
            failure_points: Vec::new(),
            suggestions: Vec::new(),
            performance_notes: String::new(),
            edge_cases: Vec::new(),
        }
    }

    /// Feedback rejecting the attempt for the given reasons.
    pub fn rejected(analysis: impl Into<String>, failure_points: Vec<String>) -> Self {
        Self {
            success: false,
            analysis: analysis.into(),
            failure_points,
            suggestions: Vec::new(),
            performance_notes: String::new(),
            edge_cases: Vec::new(),
        }
    }

    /// Substitute record used when the evaluator answer could not be parsed.
    pub fn parse_failure_default(policy: ParseFailurePolicy) -> Self {
        Self {
            success: policy == ParseFailurePolicy::AcceptAsSuccess,
            analysis: "Failed to parse evaluation response".to_string(),
            failure_points: vec!["Evaluation response parsing error".to_string()],
            suggestions: vec!["Check the raw response format".to_string()],
            performance_notes: "N/A".to_string(),
            edge_cases: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct FeedbackWire {
    success: bool,
    #[serde(default)]
    feedback: FeedbackBody,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct FeedbackBody {
    technical_analysis: String,
    failure_points: Vec<String>,
    suggestions: Vec<String>,
    performance_notes: String,
    edge_cases: Vec<String>,
}

impl From<FeedbackWire> for Feedback {
    fn from(wire: FeedbackWire) -> Self {
        Self {
            success: wire.success,
            analysis: wire.feedback.technical_analysis,
            failure_points: wire.feedback.failure_points,
            suggestions: wire.feedback.suggestions,
            performance_notes: wire.feedback.performance_notes,
            edge_cases: wire.feedback.edge_cases,
        }
    }
}

impl From<Feedback> for FeedbackWire {
    fn from(feedback: Feedback) -> Self {
        Self {
            success: feedback.success,
            feedback: FeedbackBody {
                technical_analysis: feedback.analysis,
                failure_points: feedback.failure_points,
                suggestions: feedback.suggestions,
                performance_notes: feedback.performance_notes,
                edge_cases: feedback.edge_cases,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_verdict() {
        let json = r#"{
            "success": false,
            "feedback": {
                "technical_analysis": "Off by one",
                "failure_points": ["loop bound"],
                "suggestions": ["use inclusive range"],
                "performance_notes": "O(n)",
                "edge_cases": ["empty input"]
            }
        }"#;
        let feedback: Feedback = serde_json::from_str(json).unwrap();
        assert!(!feedback.success);
        assert_eq!(feedback.analysis, "Off by one");
        assert_eq!(feedback.failure_points, vec!["loop bound"]);
        assert_eq!(feedback.suggestions, vec!["use inclusive range"]);
        assert_eq!(feedback.performance_notes, "O(n)");
        assert_eq!(feedback.edge_cases, vec!["empty input"]);
    }

    #[test]
    fn test_deserialize_missing_body_defaults() {
        let feedback: Feedback = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(feedback.success);
        assert!(feedback.analysis.is_empty());
        assert!(feedback.failure_points.is_empty());
    }

    #[test]
    fn test_deserialize_requires_success() {
        let result = serde_json::from_str::<Feedback>(r#"{"feedback": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let value = serde_json::to_value(Feedback::rejected("bad", vec!["x".into()])).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["feedback"]["technical_analysis"], "bad");
        assert_eq!(value["feedback"]["failure_points"][0], "x");
    }

    #[test]
    fn test_parse_failure_default_lenient() {
        let feedback = Feedback::parse_failure_default(ParseFailurePolicy::AcceptAsSuccess);
        assert!(feedback.success);
        assert_eq!(feedback.analysis, "Failed to parse evaluation response");
        assert_eq!(feedback.performance_notes, "N/A");
    }

    #[test]
    fn test_parse_failure_default_strict() {
        let feedback = Feedback::parse_failure_default(ParseFailurePolicy::TreatAsFailure);
        assert!(!feedback.success);
        assert_eq!(feedback.failure_points, vec!["Evaluation response parsing error"]);
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&ParseFailurePolicy::AcceptAsSuccess).unwrap();
        assert_eq!(json, "\"accept-as-success\"");
        let policy: ParseFailurePolicy = serde_json::from_str("\"treat-as-failure\"").unwrap();
        assert_eq!(policy, ParseFailurePolicy::TreatAsFailure);
    }
}
