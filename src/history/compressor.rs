//! Bounded record of past attempts.
//!
//! Each new generation request sees a summary of every attempt so far rather
//! than the raw log: a short code excerpt and key issues per attempt, the set
//! of distinct error first-lines, and the most recent attempt in full.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::Attempt;

/// Caps applied while compressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLimits {
    /// Characters of source kept per attempt summary
    pub excerpt_chars: usize,
    /// Summaries retained; older ones are dropped first
    pub max_summaries: usize,
    /// Lines of program output shown for the most recent attempt
    pub max_output_lines: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            excerpt_chars: 200,
            max_summaries: 10,
            max_output_lines: 50,
        }
    }
}

/// Compressed view of a single past attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub index: u32,
    pub code_excerpt: String,
    pub key_issues: Vec<String>,
}

/// What the generator sees of earlier attempts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompressedHistory {
    /// Number of attempts recorded, including those whose summaries were dropped
    pub attempt_count: u32,
    /// First line of each distinct execution error
    pub error_signatures: BTreeSet<String>,
    pub summaries: VecDeque<AttemptSummary>,
    pub most_recent: Option<Attempt>,
}

impl CompressedHistory {
    pub fn is_empty(&self) -> bool {
        self.attempt_count == 0
    }

    /// Render as a markdown block for inclusion in a generation prompt.
    ///
    /// Returns an empty string when nothing has been recorded.
    pub fn render(&self, max_output_lines: usize) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut output = String::new();
        output.push_str("## Previous Attempts\n\n");
        output.push_str(&format!("**Summary:** {} attempt(s) so far\n", self.attempt_count));

        for summary in &self.summaries {
            output.push_str(&format!("- Attempt {}: `{}`", summary.index, one_line(&summary.code_excerpt)));
            if !summary.key_issues.is_empty() {
                output.push_str(&format!(" (issues: {})", summary.key_issues.join("; ")));
            }
            output.push('\n');
        }
        output.push('\n');

        if !self.error_signatures.is_empty() {
            output.push_str("**Distinct errors seen:**\n");
            for signature in &self.error_signatures {
                output.push_str(&format!("- {}\n", signature));
            }
            output.push('\n');
        }

        if let Some(latest) = &self.most_recent {
            output.push_str("**Most recent attempt (focus on fixing this first):**\n\n");
            output.push_str(&render_attempt(latest, max_output_lines));
        }

        output
    }
}

/// Accumulates attempts into a `CompressedHistory`.
#[derive(Debug, Clone, Default)]
pub struct HistoryCompressor {
    limits: HistoryLimits,
    history: CompressedHistory,
}

impl HistoryCompressor {
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            limits,
            history: CompressedHistory::default(),
        }
    }

    /// Fold one attempt into the compressed state.
    pub fn record(&mut self, attempt: Attempt) {
        self.history.attempt_count += 1;

        if let Some(signature) = attempt.error_signature() {
            self.history.error_signatures.insert(signature);
        }

        self.history.summaries.push_back(AttemptSummary {
            index: attempt.index,
            code_excerpt: excerpt(&attempt.source_code, self.limits.excerpt_chars),
            key_issues: attempt.failure_points().to_vec(),
        });
        while self.history.summaries.len() > self.limits.max_summaries {
            self.history.summaries.pop_front();
        }

        self.history.most_recent = Some(attempt);
    }

    /// Current compressed state. Pure read.
    pub fn summarize(&self) -> &CompressedHistory {
        &self.history
    }

    /// Consume the compressor, keeping its final state.
    pub fn into_history(self) -> CompressedHistory {
        self.history
    }
}

/// First `max_chars` characters of `code`, marked when cut.
fn excerpt(code: &str, max_chars: usize) -> String {
    let mut chars = code.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_attempt(attempt: &Attempt, max_output_lines: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!("Attempt {} code:\n```\n{}\n```\n\n", attempt.index, attempt.source_code));

    match &attempt.execution {
        Some(execution) if execution.timed_out => {
            output.push_str(&format!("Execution: timed out. {}\n\n", execution.stderr));
        }
        Some(execution) => {
            output.push_str(&format!("Execution: exit code {}\n", execution.exit_code));
            if !execution.stdout.trim().is_empty() {
                output.push_str(&format!(
                    "stdout:\n```\n{}\n```\n",
                    truncate_lines(execution.stdout.trim_end(), max_output_lines)
                ));
            }
            if !execution.stderr.trim().is_empty() {
                output.push_str(&format!(
                    "stderr:\n```\n{}\n```\n",
                    truncate_lines(execution.stderr.trim_end(), max_output_lines)
                ));
            }
            output.push('\n');
        }
        None => output.push_str("Execution: not started\n\n"),
    }

    if let Some(feedback) = &attempt.feedback {
        output.push_str("Evaluator feedback:\n");
        if !feedback.analysis.is_empty() {
            output.push_str(&format!("- Analysis: {}\n", feedback.analysis));
        }
        push_list(&mut output, "Failure points", &feedback.failure_points);
        push_list(&mut output, "Suggestions", &feedback.suggestions);
        push_list(&mut output, "Edge cases", &feedback.edge_cases);
        if !feedback.performance_notes.is_empty() {
            output.push_str(&format!("- Performance: {}\n", feedback.performance_notes));
        }
    }

    output
}

fn push_list(output: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        output.push_str(&format!("- {}: {}\n", label, items.join(", ")));
    }
}

/// Truncate text to a maximum number of lines.
fn truncate_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().take(max_lines).collect();
    let truncated = lines.len() < text.lines().count();
    let mut result = lines.join("\n");
    if truncated {
        result.push_str("\n... (truncated)");
    }
    result
}
