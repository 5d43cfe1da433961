//! Per-request scratch directories.

use std::path::Path;

use chrono::Utc;
use tempfile::TempDir;
use tracing::debug;

/// Creates `<root>/rendercv-<unix millis>-<random>`. The directory is removed
/// when the returned handle drops, unless `keep` is set.
pub fn create(root: &Path, keep: bool) -> std::io::Result<TempDir> {
    std::fs::create_dir_all(root)?;
    let prefix = format!("rendercv-{}-", Utc::now().timestamp_millis());
    let dir = tempfile::Builder::new()
        .prefix(&prefix)
        .rand_bytes(8)
        .disable_cleanup(keep)
        .tempdir_in(root)?;
    debug!(keep, "Created scratch directory {}", dir.path().display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let scratch = create(root.path(), false).unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("tailored_cv.yaml"), "cv: {}").unwrap();
        assert!(path.is_dir());
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_when_requested() {
        let root = tempfile::tempdir().unwrap();
        let path = create(root.path(), true).unwrap().path().to_path_buf();
        assert!(path.is_dir());
    }

    #[test]
    fn test_missing_root_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("scratch").join("tailor");
        let scratch = create(&nested, false).unwrap();
        assert!(scratch.path().starts_with(&nested));
    }

    #[test]
    fn test_concurrent_requests_get_distinct_dirs() {
        let root = tempfile::tempdir().unwrap();
        let a = create(root.path(), false).unwrap();
        let b = create(root.path(), false).unwrap();
        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("rendercv-"));
    }
}
