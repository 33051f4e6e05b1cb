//! Scratch project roots for end-to-end tests.

use tempfile::TempDir;

/// A throwaway project root with `data_processed/` and `figs/` created.
///
/// The directory is removed when the returned guard is dropped.
pub fn scratch_project() -> std::io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("data_processed"))?;
    std::fs::create_dir_all(dir.path().join("figs"))?;
    Ok(dir)
}
