//! Reading and writing single parts inside an expanded container.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

/// Path of the main document part of a Word document.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Resolve a `/`-separated part name below `root`.
///
/// Names that are absolute or climb out of `root` do not name a part.
pub fn part_path(root: &Path, name: &str) -> Result<PathBuf> {
    let invalid = || Error::NotFound(format!("invalid part name '{}'", name));
    if name.starts_with('/') {
        return Err(invalid());
    }

    let mut path = root.to_path_buf();
    let mut depth = 0;
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(invalid()),
            segment => {
                path.push(segment);
                depth += 1;
            }
        }
    }
    if depth == 0 {
        return Err(invalid());
    }
    Ok(path)
}

/// Read the raw bytes of part `name`.
pub fn read_part(root: impl AsRef<Path>, name: &str) -> Result<Vec<u8>> {
    let path = part_path(root.as_ref(), name)?;
    match fs::read(&path) {
        Ok(bytes) => {
            debug!("read {} ({} bytes)", name, bytes.len());
            Ok(bytes)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(name.to_string())),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Replace the bytes of part `name`.
///
/// The new content goes to a temporary file in the same directory, which is
/// then renamed over the part, so readers never see a partial write.
pub fn write_part(root: impl AsRef<Path>, name: &str, bytes: &[u8]) -> Result<()> {
    let path = part_path(root.as_ref(), name)?;
    let dir = path
        .parent()
        .ok_or_else(|| Error::NotFound(name.to_string()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(&path)?;

    debug!("wrote {} ({} bytes)", name, bytes.len());
    Ok(())
}
