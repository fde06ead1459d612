//! Download-or-load file cache
//!
//! Every downloaded document is written to a flat file and read back on the
//! next request. Nothing expires; the caller forces a new download with the
//! `refresh` flag, which overwrites the file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Return the contents of `path`, calling `download` first when the file is
/// missing or `refresh` is set.
pub fn load_or_fetch<F>(path: &Path, refresh: bool, download: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    let exists = path.is_file();

    if exists && !refresh {
        tracing::debug!("Cache hit: {:?}", path);
        return fs::read_to_string(path).map_err(|e| Error::io(path, e));
    }

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    tracing::info!("Downloading {:?}", path.file_name().unwrap_or_default());
    let body = download()?;

    if exists {
        tracing::warn!("Overwriting cached file {:?}", path);
    }
    fs::write(path, &body).map_err(|e| Error::io(path, e))?;
    tracing::info!("Saved {} to {:?}", format_bytes(body.len() as u64), path);

    Ok(body)
}

/// Create `dir` (and parents) if needed, logging every folder created
pub fn ensure_dir(dir: &Path) -> Result<()> {
    for created in create_dirs(dir)? {
        tracing::info!("Created folder {:?}", created);
    }
    Ok(())
}

/// Create `dir` and any missing parents, returning the folders that did not
/// exist before, outermost first
pub fn create_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut missing: Vec<PathBuf> = dir
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.is_dir())
        .map(Path::to_path_buf)
        .collect();
    if missing.is_empty() {
        return Ok(missing);
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    missing.reverse();
    Ok(missing)
}

/// Format bytes as human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_downloads_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/file.json");

        let body = load_or_fetch(&path, false, || Ok("{}".to_string())).unwrap();
        assert_eq!(body, "{}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_cached_file_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.xml");
        fs::write(&path, "<cached/>").unwrap();

        let calls = Cell::new(0);
        let body = load_or_fetch(&path, false, || {
            calls.set(calls.get() + 1);
            Ok("<fresh/>".to_string())
        })
        .unwrap();

        assert_eq!(body, "<cached/>");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_refresh_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.xml");
        fs::write(&path, "<cached/>").unwrap();

        let body = load_or_fetch(&path, true, || Ok("<fresh/>".to_string())).unwrap();
        assert_eq!(body, "<fresh/>");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<fresh/>");
    }

    #[test]
    fn test_failed_download_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");

        let result = load_or_fetch(&path, false, || Err(Error::EmptyMarkup));
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_create_dirs_reports_each_new_folder() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wiki/cache");

        let created = create_dirs(&target).unwrap();
        assert_eq!(created, vec![dir.path().join("wiki"), target.clone()]);
        assert!(target.is_dir());

        assert!(create_dirs(&target).unwrap().is_empty());
        assert!(create_dirs(Path::new("")).unwrap().is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }
}
