use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

/// Marker file written at the output root once assets land, holding the
/// build's completion timestamp as decimal milliseconds since epoch.
pub const CHANGE_FILE: &str = "change";

#[derive(Debug)]
pub enum AssetError {
    Io(std::io::Error),
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io(err)
    }
}

impl From<walkdir::Error> for AssetError {
    fn from(err: walkdir::Error) -> Self {
        AssetError::Walk(err)
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Io(e) => write!(f, "IO error: {}", e),
            AssetError::Walk(e) => write!(f, "Walk error: {}", e),
            AssetError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for AssetError {}

/// Copy theme static files into the output root, then user assets (so user
/// files override same-named static ones), then stamp the change marker.
///
/// Strictly sequenced; the first failure stops the chain and nothing already
/// copied is cleaned up. A missing user asset directory is skipped.
pub fn run_asset_pipeline(
    static_dir: &Path,
    asset_dir: &Path,
    target_root: &Path,
) -> Result<(), AssetError> {
    copy_tree(static_dir, target_root)?;

    if asset_dir.is_dir() {
        copy_tree(asset_dir, target_root)?;
    }

    write_change_marker(target_root)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), AssetError> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| AssetError::InvalidPath(entry.path().to_path_buf()))?;
        let dest = dst.join(rel);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest)?;
    }

    Ok(())
}

fn write_change_marker(target_root: &Path) -> Result<(), AssetError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    fs::write(target_root.join(CHANGE_FILE), millis.to_string())?;

    Ok(())
}
