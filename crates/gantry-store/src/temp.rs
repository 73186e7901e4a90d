use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;
use tracing::debug;

/// Allocator for the temporary files backing binary stores.
///
/// Implementations must return a path whose file was exclusively created by
/// this call; two calls never hand out the same path. Cleanup of files still
/// present when the provider is dropped is the provider's responsibility.
pub trait TempFileProvider: Send + Sync {
    /// Create a fresh, empty temporary file and return its path.
    fn create_temp_file(&self, prefix: &str, suffix: &str) -> io::Result<PathBuf>;
}

/// Default provider: a private session directory plus a counter.
///
/// Files are named `{prefix}-{n}{suffix}` inside a `tempfile::TempDir`.
/// Stores delete their own files on close; the directory (and anything a
/// crashed resolution left behind) is removed when the provider drops.
pub struct SessionTempFiles {
    dir: TempDir,
    next: AtomicU64,
}

impl SessionTempFiles {
    /// Create a session directory under the system temp location.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("gantry-resolution").tempdir()?;
        debug!(dir = %dir.path().display(), "created resolution temp directory");
        Ok(Self {
            dir,
            next: AtomicU64::new(0),
        })
    }

    /// Path of the session directory.
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl TempFileProvider for SessionTempFiles {
    fn create_temp_file(&self, prefix: &str, suffix: &str) -> io::Result<PathBuf> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.path().join(format!("{prefix}-{n}{suffix}"));
        // create_new guarantees exclusive creation; the counter guarantees
        // the name is unused, so a hit here is a real error.
        OpenOptions::new().write(true).create_new(true).open(&path)?;
        Ok(path)
    }
}

impl std::fmt::Debug for SessionTempFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTempFiles")
            .field("dir", &self.dir.path())
            .field("allocated", &self.next.load(Ordering::Relaxed))
            .finish()
    }
}
