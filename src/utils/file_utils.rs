use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{Result, ThemeError};

/// Hex characters of the SHA-256 digest kept in cache keys
pub const HASH_PREFIX_LEN: usize = 20;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Replace `path` with `contents` so readers only ever see the old or the new
/// file: temp file in the same directory, fsync, rename. An existing file's
/// permissions carry over to the replacement.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    match fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Point `link` at `target`, replacing whatever `link` was. The new link is
/// created under a temporary name and renamed over the old one.
#[cfg(unix)]
pub fn replace_symlink(target: &Path, link: &Path) -> io::Result<()> {
    let name = link
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "symlink path has no file name"))?;
    let tmp = link.with_file_name(format!(".{}.{}.tmp", name.to_string_lossy(), std::process::id()));

    match fs::remove_file(&tmp) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::os::unix::fs::symlink(target, &tmp)?;
    if let Err(e) = fs::rename(&tmp, link) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn replace_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks are only supported on unix"))
}

/// First `HASH_PREFIX_LEN` hex characters of the SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(HASH_PREFIX_LEN);
    hex
}

pub fn hash_file(path: &Path) -> io::Result<String> {
    Ok(content_hash(&read_file(path)?))
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Resolve an input path into the images it names.
///
/// A file must carry a decodable image header. A directory yields its
/// `png/jpg/jpeg` entries (non-recursive, sorted); decoding problems in those
/// surface later, per image.
pub fn get_image_list(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut images: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(ThemeError::NoImages(path.to_path_buf()));
        }
        return Ok(images);
    }

    image::image_dimensions(path).map_err(|source| ThemeError::InvalidImage { path: path.to_path_buf(), source })?;
    Ok(vec![path.to_path_buf()])
}
