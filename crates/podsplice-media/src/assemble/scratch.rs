//! Per-run scratch directory.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

use crate::error::MediaResult;

/// Exclusively owned directory for one run's intermediate files.
///
/// Removed by [`ScratchDir::cleanup`]; dropping it also removes it, which
/// covers panics and early returns.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory under `work_dir`.
    pub async fn create(work_dir: &Path) -> MediaResult<Self> {
        tokio::fs::create_dir_all(work_dir).await?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("podsplice-{}-", Uuid::new_v4().simple()))
            .tempdir_in(work_dir)?;
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Uncompressed decode of the source.
    pub fn intermediate(&self) -> PathBuf {
        self.path().join("source.wav")
    }

    pub fn segment(&self, index: usize) -> PathBuf {
        self.path().join(format!("seg_{:05}.wav", index))
    }

    pub fn manifest(&self) -> PathBuf {
        self.path().join("concat.txt")
    }

    pub fn joined(&self) -> PathBuf {
        self.path().join("joined.wav")
    }

    pub fn staged(&self, file_name: &str) -> PathBuf {
        self.path().join(file_name)
    }

    /// Remove the directory and everything in it.
    pub fn cleanup(self) -> MediaResult<()> {
        let path = self.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "Removed scratch directory");
        Ok(())
    }
}

/// Concat demuxer manifest listing `files` in order.
pub fn concat_manifest(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| {
            let escaped = f.to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_layout_and_cleanup() {
        let work = TempDir::new().unwrap();
        let scratch = ScratchDir::create(work.path()).await.unwrap();
        let root = scratch.path().to_path_buf();

        assert!(root.starts_with(work.path()));
        assert_eq!(scratch.segment(7), root.join("seg_00007.wav"));
        std::fs::write(scratch.segment(0), b"x").unwrap();

        scratch.cleanup().unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_runs_get_distinct_directories() {
        let work = TempDir::new().unwrap();
        let a = ScratchDir::create(work.path()).await.unwrap();
        let b = ScratchDir::create(work.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_create_makes_missing_work_dir() {
        let base = TempDir::new().unwrap();
        let work = base.path().join("nested").join("work");
        let scratch = ScratchDir::create(&work).await.unwrap();
        assert!(scratch.path().starts_with(&work));
        assert!(work.is_dir());
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let work = TempDir::new().unwrap();
        let root = {
            let scratch = ScratchDir::create(work.path()).await.unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn test_manifest_escapes_quotes() {
        let manifest = concat_manifest(&[
            PathBuf::from("/tmp/a/seg_00000.wav"),
            PathBuf::from("/tmp/it's/seg_00001.wav"),
        ]);
        assert_eq!(
            manifest,
            "file '/tmp/a/seg_00000.wav'\nfile '/tmp/it'\\''s/seg_00001.wav'\n"
        );
    }
}
