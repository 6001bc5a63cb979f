//! Publishing rendered output into place.
//!
//! Output is always produced inside the run's scratch directory and only
//! moved to its destination once it is complete, so a failed run never
//! leaves a half-written file at the requested path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Move a finished file from scratch to `dst`, replacing any existing file.
///
/// Tries a rename first. Across filesystems (EXDEV) it copies to a hidden
/// sibling of `dst` and renames that, so `dst` is either the old file or
/// the complete new one.
pub async fn publish_output(staged: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let staged = staged.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !fs::try_exists(parent).await? {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(staged, dst).await {
        Ok(()) => {
            debug!(output = %dst.display(), "Published output");
            Ok(())
        }
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                "Cross-device rename, copying instead: {} -> {}",
                staged.display(),
                dst.display()
            );
            copy_into_place(staged, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is 18 on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

fn partial_path(dst: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dst.file_name().unwrap_or_default());
    name.push(".partial");
    dst.with_file_name(name)
}

async fn copy_into_place(staged: &Path, dst: &Path) -> MediaResult<()> {
    let partial = partial_path(dst);

    if let Err(e) = fs::copy(staged, &partial).await {
        let _ = fs::remove_file(&partial).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&partial, dst).await {
        if let Err(cleanup) = fs::remove_file(&partial).await {
            warn!(path = %partial.display(), "Failed to remove partial output: {}", cleanup);
        }
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_publish_same_filesystem() {
        let dir = TempDir::new().unwrap();
        let staged = dir.path().join("output.mp3");
        let dst = dir.path().join("episode_edited.mp3");
        fs::write(&staged, b"audio").await.unwrap();

        publish_output(&staged, &dst).await.unwrap();

        assert!(!staged.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"audio");
    }

    #[tokio::test]
    async fn test_publish_creates_parent_and_replaces() {
        let dir = TempDir::new().unwrap();
        let staged = dir.path().join("output.wav");
        let dst = dir.path().join("out").join("final.wav");
        fs::create_dir_all(dst.parent().unwrap()).await.unwrap();
        fs::write(&dst, b"old").await.unwrap();
        fs::write(&staged, b"new").await.unwrap();

        publish_output(&staged, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_missing_staged_file_leaves_destination() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("final.mp3");

        assert!(publish_output(dir.path().join("nope.mp3"), &dst).await.is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let partial = partial_path(Path::new("/data/show/ep1.mp3"));
        assert_eq!(partial, PathBuf::from("/data/show/.ep1.mp3.partial"));
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
