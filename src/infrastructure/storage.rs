use std::fs;
use std::path::{Path, PathBuf};

/// Create the upload directory if it does not exist yet.
pub fn ensure_upload_dir(upload_dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(upload_dir)?;
    Ok(upload_dir.to_path_buf())
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
