//! File-safety helpers shared by every adapter that reads or writes
//! collaborator-supplied paths.

use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum size for a scan-records input file (100 MB)
pub const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum size for a configuration file (1 MB)
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Validates that a path exists, is not a symbolic link and is a regular file.
///
/// `symlink_metadata()` is used so the link itself is inspected, not its target.
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {} metadata for {}: {}",
            file_description,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(metadata.len())
}

/// Rejects files larger than `max_size` bytes.
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

/// Reads a file to a string after the regular-file and size checks pass.
pub fn read_bounded_file(path: &Path, file_description: &str, max_size: u64) -> Result<String> {
    let size = validate_regular_file(path, file_description)?;
    validate_file_size(size, path, max_size)?;

    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} {}: {}", file_description, path.display(), e))
}

/// Rejects an output path that already exists as a symbolic link.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        if metadata.is_symlink() {
            anyhow::bail!(
                "Security: {} is a symbolic link. For security reasons, writing to symbolic links is not allowed.",
                path.display()
            );
        }
    }

    if let Some(parent) = path.parent() {
        if parent != Path::new("") && !parent.is_dir() {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    Ok(())
}
