//! Expanding a container into a working directory and packing it back.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::options::Compression;

fn open_container(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| match e {
        zip::result::ZipError::Io(e) => Error::Io(e),
        other => Error::NotFound(format!("{} is not a valid archive: {}", path.display(), other)),
    })
}

/// Unpack every entry of `container` below `dest`.
///
/// Intermediate directories are created and existing files are overwritten.
/// Returns the `/`-separated names of the files written, in archive order.
pub fn expand(container: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<Vec<String>> {
    let container = container.as_ref();
    let dest = dest.as_ref();
    let mut archive = open_container(container)?;
    fs::create_dir_all(dest)?;

    let mut written = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| Error::Archive(format!("unsafe entry name '{}'", entry.name())))?;
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&target)?);
        io::copy(&mut entry, &mut out)?;
        out.flush()?;

        debug!("expanded {}", entry.name());
        written.push(entry.name().to_string());
    }

    info!(
        "expanded {} entries from {} into {}",
        written.len(),
        container.display(),
        dest.display()
    );
    Ok(written)
}

/// Entry name of `path` relative to `root`, always `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::Archive(format!("{} is outside {}", path.display(), root.display())))?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Ok(parts.join("/"))
}

/// Every regular file below `root`, sorted by name within each directory.
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        files.push((entry_name(root, entry.path())?, entry.into_path()));
    }
    Ok(files)
}

/// Pack every file below `root` into a new container at `output`.
///
/// The archive is assembled in a temporary file next to `output` and moved
/// into place only once it is complete. Returns the number of entries.
pub fn repackage(
    root: impl AsRef<Path>,
    output: impl AsRef<Path>,
    compression: Compression,
) -> Result<usize> {
    let root = root.as_ref();
    let output = output.as_ref();

    // Listed before the temporary file exists so it can never be an entry.
    let files = collect_files(root)?;

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".docfill-")
        .suffix(".tmp")
        .tempfile_in(parent)?;

    let mut zip = ZipWriter::new(BufWriter::new(temp));
    let options = SimpleFileOptions::default().compression_method(compression.method());
    for (name, path) in &files {
        let mut input = File::open(path)?;
        zip.start_file(name.as_str(), options)?;
        io::copy(&mut input, &mut zip)?;
        debug!("packed {}", name);
    }

    let temp = zip
        .finish()?
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    temp.persist(output)?;

    info!("wrote {} entries to {}", files.len(), output.display());
    Ok(files.len())
}
