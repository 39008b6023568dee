//! # typeplan-host
//!
//! File system facade used by the planner, the dependency resolver and
//! in-process compiler backends.
//!
//! The [`IoHost`] trait is deliberately small: existence checks, raw byte
//! I/O and directory creation are the only required methods. Everything a
//! compiler needs on top of that (BOM-aware decoding, encoded writes, the
//! ancestor-directory search used to resolve reference directives) is
//! provided in terms of those primitives.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use typeplan_host::{IoHost, NativeHost};
//!
//! # #[tokio::main]
//! # async fn main() -> typeplan_host::HostResult<()> {
//! let host = NativeHost::new("/project");
//! let lib = host
//!     .find_file_upward(Path::new("/project/src/app"), Path::new("typings/lib.d.ts"))
//!     .await?;
//! if let Some(file) = lib {
//!     println!("{} ({})", file.path().display(), file.marker());
//! }
//! # Ok(()) }
//! ```

pub mod encoding;
pub mod native;
pub mod path;
pub mod source;

pub use encoding::{ByteOrderMark, DecodeError};
pub use native::NativeHost;
pub use path::resolve_path;
pub use source::SourceFile;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur during host operations
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Read or write failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content does not match the detected encoding
    #[error("Cannot decode {} as {marker}: {reason}", .path.display())]
    Decode {
        path: PathBuf,
        marker: ByteOrderMark,
        reason: String,
    },

    /// Blocking I/O task could not be joined
    #[error("Host task failed: {0}")]
    Task(String),
}

impl HostError {
    /// Path the failed operation touched, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            HostError::FileNotFound(path) => Some(path),
            HostError::Io { path, .. } | HostError::Decode { path, .. } => Some(path),
            HostError::Task(_) => None,
        }
    }
}

/// Uniform file system interface for compiler backends.
///
/// Implementations must be shareable across concurrently running jobs.
/// Reads are idempotent, so two jobs racing on the same file is harmless.
#[async_trait]
pub trait IoHost: Send + Sync + std::fmt::Debug {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_directory(&self, path: &Path) -> bool;

    /// Read raw bytes
    async fn read_bytes(&self, path: &Path) -> HostResult<Vec<u8>>;

    /// Write raw bytes, creating parent directories as needed
    async fn write_bytes(&self, path: &Path, content: &[u8]) -> HostResult<()>;

    /// Create a directory and all of its parents
    async fn create_dir_all(&self, path: &Path) -> HostResult<()>;

    /// Directory relative paths are resolved against
    fn cwd(&self) -> &Path;

    /// Read and decode a file, stripping any byte-order mark.
    async fn read_file(&self, path: &Path) -> HostResult<SourceFile> {
        let path = self.resolve_path(self.cwd(), path);
        let raw = self.read_bytes(&path).await?;
        SourceFile::decode(path, raw)
    }

    /// Write text encoded according to `marker`, emitting the marker bytes first.
    async fn write_file(&self, path: &Path, text: &str, marker: ByteOrderMark) -> HostResult<()> {
        let path = self.resolve_path(self.cwd(), path);
        self.write_bytes(&path, &encoding::encode(text, marker)).await
    }

    /// Search `start_dir` and then each ancestor for `relative`.
    ///
    /// Returns the first existing regular file. The walk ends at the file
    /// system root, so it takes at most `depth(start_dir) + 1` steps.
    async fn find_file_upward(
        &self,
        start_dir: &Path,
        relative: &Path,
    ) -> HostResult<Option<SourceFile>> {
        let start = self.resolve_path(self.cwd(), start_dir);

        if relative.is_absolute() {
            let candidate = path::normalize(relative);
            if self.exists(&candidate) && !self.is_directory(&candidate) {
                return self.read_file(&candidate).await.map(Some);
            }
            return Ok(None);
        }

        for dir in start.ancestors() {
            let candidate = self.resolve_path(dir, relative);
            if self.exists(&candidate) && !self.is_directory(&candidate) {
                tracing::trace!(
                    candidate = %candidate.display(),
                    "found file in ancestor search"
                );
                return self.read_file(&candidate).await.map(Some);
            }
        }

        Ok(None)
    }

    /// Join `relative` onto `base` and normalize the result. No I/O.
    fn resolve_path(&self, base: &Path, relative: &Path) -> PathBuf {
        path::resolve_path(base, relative)
    }
}
