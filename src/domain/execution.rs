//! Outcome of a single sandboxed program run.

use serde::{Deserialize, Serialize};

/// Exit status reported when the process never produced one of its own
/// (deadline exceeded, launch failure, killed by a signal).
pub const NO_EXIT_CODE: i32 = -1;

/// Captured result of running one program. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True only when the process exited with status 0
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    /// Process exit status, or -1 when there was none
    pub exit_code: i32,
    /// True when the process was killed for exceeding its deadline
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Result for a process that ran to completion on its own.
    pub fn completed(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            succeeded: exit_code == 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            timed_out: false,
        }
    }

    /// Result for a process that was killed at its deadline.
    pub fn deadline_exceeded(timeout_secs: u64) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: format!("Execution exceeded the time limit of {} seconds", timeout_secs),
            exit_code: NO_EXIT_CODE,
            timed_out: true,
        }
    }

    /// Result for a program that could not be started at all.
    pub fn launch_failed(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: reason.into(),
            exit_code: NO_EXIT_CODE,
            timed_out: false,
        }
    }

    /// First non-empty line of the error text, used as a deduplication key.
    ///
    /// Falls back to the exit status when the program failed silently.
    /// Returns `None` for successful runs.
    pub fn error_signature(&self) -> Option<String> {
        if self.succeeded {
            return None;
        }
        let first_line = self.stderr.lines().map(str::trim).find(|line| !line.is_empty());
        Some(match first_line {
            Some(line) => line.to_string(),
            None => format!("exit code {}", self.exit_code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_success() {
        let result = ExecutionResult::completed(0, "hi\n", "");
        assert!(result.succeeded);
        assert_eq!(result.exit_code, 0);
        assert!(!result.timed_out);
        assert_eq!(result.error_signature(), None);
    }

    #[test]
    fn test_completed_nonzero_is_failure() {
        let result = ExecutionResult::completed(2, "", "boom");
        assert!(!result.succeeded);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn test_deadline_exceeded_mentions_timeout() {
        let result = ExecutionResult::deadline_exceeded(2);
        assert!(!result.succeeded);
        assert!(result.timed_out);
        assert_eq!(result.exit_code, NO_EXIT_CODE);
        assert!(result.stderr.contains('2'));
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn test_launch_failed() {
        let result = ExecutionResult::launch_failed("No such file or directory");
        assert!(!result.succeeded);
        assert!(!result.timed_out);
        assert_eq!(result.exit_code, -1);
        assert_eq!(result.stderr, "No such file or directory");
    }

    #[test]
    fn test_error_signature_first_line() {
        let result = ExecutionResult::completed(
            1,
            "",
            "\nTraceback (most recent call last):\n  File \"x.py\", line 1\nZeroDivisionError: division by zero\n",
        );
        assert_eq!(result.error_signature().as_deref(), Some("Traceback (most recent call last):"));
    }

    #[test]
    fn test_error_signature_falls_back_to_exit_code() {
        let result = ExecutionResult::completed(3, "", "   \n");
        assert_eq!(result.error_signature().as_deref(), Some("exit code 3"));
    }
}
