use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use deck_logging::deck_debug;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {} is not usable: {reason}", .path.display())]
    OutputDir { path: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` if needed and checks that it is a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        reason,
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| unusable(e.to_string()))?;
        if !meta.is_dir() {
            return Err(unusable("not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| unusable(e.to_string()))?;
    }
    Ok(())
}

/// Writes `content` to `target` through a temp file in the same directory,
/// so readers never see a half-written slide or snapshot.
pub fn write_atomic(target: &Path, content: &str) -> Result<PathBuf, PersistError> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_output_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    deck_debug!("wrote {} bytes to {}", content.len(), target.display());
    Ok(target.to_path_buf())
}

/// `slide-{nn}--{hash}.html`, where the hash covers the markup so edited
/// revisions of the same slide get distinct names.
pub fn slide_filename(slide_number: u32, html: &str) -> String {
    format!("slide-{slide_number:02}--{}.html", short_hash(html))
}

fn short_hash(input: &str) -> String {
    use std::fmt::Write as _;
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
