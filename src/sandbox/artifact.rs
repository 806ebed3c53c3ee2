//! Scratch file holding the program under execution.
//!
//! The file is owned by a guard: whatever path `ProcessSandbox::execute`
//! leaves by (normal exit, failure, deadline, panic unwinding), dropping the
//! guard removes the file. Removal errors are logged and swallowed.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::id::generate_artifact_name;

/// A uniquely named transient file that is deleted on drop.
#[derive(Debug)]
pub struct ScratchArtifact {
    path: PathBuf,
}

impl ScratchArtifact {
    /// Create a fresh file in `dir` and write `contents` to it.
    ///
    /// The name comes from `generate_artifact_name` and the file is opened
    /// with `create_new`, so an existing file is never reused.
    pub fn create(dir: &Path, extension: &str, contents: &str) -> io::Result<Self> {
        let path = dir.join(generate_artifact_name(extension));
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;

        // From here on the guard owns the file, so a failed write still cleans up.
        let artifact = Self { path };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        debug!("Created scratch artifact {}", artifact.path.display());
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch artifact {}", self.path.display()),
            Err(e) => debug!("Ignoring failure to remove {}: {}", self.path.display(), e),
        }
    }
}
