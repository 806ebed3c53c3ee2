//! ID generation utilities for coderefine
//!
//! Provides globally unique names for scratch artifacts and refinement runs.

use uuid::Uuid;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Generate a unique file name for a scratch program artifact
///
/// Format: `snippet-{timestamp_ms}-{uuid}.{extension}`
/// Example: `snippet-1738300800123-6f1c0e4b9d2a4c5e8f7a1b2c3d4e5f60.py`
pub fn generate_artifact_name(extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    let base = format!("snippet-{}-{}", now_ms(), Uuid::new_v4().simple());
    if extension.is_empty() {
        base
    } else {
        format!("{}.{}", base, extension)
    }
}

/// Generate a refinement run ID
///
/// Format: `run-{timestamp_ms}-{short_uuid}`
pub fn generate_run_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("run-{}-{}", now_ms(), &uuid[..8])
}
