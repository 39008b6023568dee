//! Native file system host.
//!
//! `NativeHost` combines in-memory virtual files with disk access. Virtual
//! files are checked first, then the host falls back to the file system.
//! Decoded reads are cached for the lifetime of the host instance, which is
//! meant to be one build invocation.

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::path::resolve_path;
use crate::{HostError, HostResult, IoHost, SourceFile};

/// Host backed by `std::fs`, with virtual file overlay and a read cache.
///
/// Blocking file operations run on tokio's blocking pool so that a slow
/// disk never stalls the scheduler's other jobs.
#[derive(Debug, Clone)]
pub struct NativeHost {
    /// Current working directory for resolving relative paths
    cwd: PathBuf,
    /// Virtual files stored in memory, keyed by normalized path
    virtual_files: Arc<RwLock<FxHashMap<PathBuf, Arc<[u8]>>>>,
    /// Decoded reads for this build
    cache: Arc<RwLock<FxHashMap<PathBuf, SourceFile>>>,
}

impl NativeHost {
    /// Create a new host with the given working directory
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            virtual_files: Arc::new(RwLock::new(FxHashMap::default())),
            cache: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    /// Create a host rooted at the process working directory.
    pub fn from_current_dir() -> HostResult<Self> {
        let cwd = std::env::current_dir().map_err(|source| HostError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self::new(cwd))
    }

    /// Add a virtual file to the host
    ///
    /// The path is normalized before storage to ensure consistent lookup.
    pub fn add_virtual_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let normalized = self.normalize(path.as_ref());
        self.cache.write().remove(&normalized);
        self.virtual_files
            .write()
            .insert(normalized, Arc::from(content.into()));
    }

    /// Check if a path exists as a virtual file
    pub fn has_virtual_file(&self, path: &Path) -> bool {
        let normalized = self.normalize(path);
        self.virtual_files.read().contains_key(&normalized)
    }

    /// Number of decoded files currently cached
    pub fn cached_files(&self) -> usize {
        self.cache.read().len()
    }

    /// Drop every cached read
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        resolve_path(&self.cwd, path)
    }

    fn virtual_file(&self, path: &Path) -> Option<Arc<[u8]>> {
        self.virtual_files.read().get(path).cloned()
    }
}

#[async_trait]
impl IoHost for NativeHost {
    fn exists(&self, path: &Path) -> bool {
        let normalized = self.normalize(path);
        if self.virtual_files.read().contains_key(&normalized) {
            return true;
        }
        normalized.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        let normalized = self.normalize(path);
        if self.virtual_files.read().contains_key(&normalized) {
            return false;
        }
        normalized.is_dir()
    }

    async fn read_bytes(&self, path: &Path) -> HostResult<Vec<u8>> {
        let path = self.normalize(path);
        if let Some(content) = self.virtual_file(&path) {
            return Ok(content.to_vec());
        }

        task::spawn_blocking(move || {
            std::fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    HostError::FileNotFound(path.clone())
                } else {
                    HostError::Io {
                        path: path.clone(),
                        source: e,
                    }
                }
            })
        })
        .await
        .map_err(|e| HostError::Task(format!("Task join error: {}", e)))?
    }

    async fn write_bytes(&self, path: &Path, content: &[u8]) -> HostResult<()> {
        let path = self.normalize(path);
        self.cache.write().remove(&path);

        let content = content.to_vec();
        task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| HostError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, content).map_err(|source| HostError::Io {
                path: path.clone(),
                source,
            })
        })
        .await
        .map_err(|e| HostError::Task(format!("Task join error: {}", e)))?
    }

    async fn create_dir_all(&self, path: &Path) -> HostResult<()> {
        let path = self.normalize(path);
        task::spawn_blocking(move || {
            std::fs::create_dir_all(&path).map_err(|source| HostError::Io {
                path: path.clone(),
                source,
            })
        })
        .await
        .map_err(|e| HostError::Task(format!("Task join error: {}", e)))?
    }

    fn cwd(&self) -> &Path {
        &self.cwd
    }

    async fn read_file(&self, path: &Path) -> HostResult<SourceFile> {
        let path = self.normalize(path);
        if let Some(file) = self.cache.read().get(&path) {
            return Ok(file.clone());
        }

        let raw = self.read_bytes(&path).await?;
        let file = SourceFile::decode(path.clone(), raw)?;
        self.cache.write().insert(path, file.clone());
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteOrderMark;
    use tempfile::TempDir;

    #[tokio::test]
    async fn virtual_file_is_read_before_disk() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.ts");
        std::fs::write(&file, b"disk").unwrap();

        let host = NativeHost::new(temp.path());
        host.add_virtual_file("a.ts", b"memory".to_vec());

        let source = host.read_file(&file).await.unwrap();
        assert_eq!(source.text(), "memory");
        assert!(host.has_virtual_file(Path::new("./a.ts")));
    }

    #[tokio::test]
    async fn missing_file_is_reported_as_not_found() {
        let temp = TempDir::new().unwrap();
        let host = NativeHost::new(temp.path());

        let err = host.read_file(Path::new("nope.ts")).await.unwrap_err();
        assert!(matches!(err, HostError::FileNotFound(p) if p.ends_with("nope.ts")));
    }

    #[tokio::test]
    async fn reads_are_cached_and_writes_invalidate() {
        let temp = TempDir::new().unwrap();
        let host = NativeHost::new(temp.path());
        let path = temp.path().join("out/x.js");

        host.write_file(&path, "one", ByteOrderMark::Absent)
            .await
            .unwrap();
        assert_eq!(host.read_file(&path).await.unwrap().text(), "one");
        assert_eq!(host.cached_files(), 1);

        host.write_file(&path, "two", ByteOrderMark::Absent)
            .await
            .unwrap();
        assert_eq!(host.read_file(&path).await.unwrap().text(), "two");
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let host = NativeHost::new(temp.path());

        host.write_bytes(Path::new("deep/er/file.js"), b"x")
            .await
            .unwrap();
        assert!(temp.path().join("deep/er").is_dir());
        assert!(host.is_directory(Path::new("deep")));
        assert!(!host.is_directory(Path::new("deep/er/file.js")));
    }
}
