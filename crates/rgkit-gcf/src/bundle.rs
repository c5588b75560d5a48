//! Source code packaging
//!
//! The function source directory is zipped into memory and uploaded to the
//! deployment bucket before the function is created.

use crate::error::{FunctionError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rgkit_core::Record;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Directories never included in a bundle
const SKIPPED_DIRS: &[&str] = &[".git", ".rgkit"];

/// A zipped source directory
#[derive(Debug, Clone)]
pub struct SourceBundle {
    /// Object name in the deployment bucket
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Where a bundle gets published
#[derive(Debug, Clone)]
pub struct BundleTarget {
    pub project: String,
    pub bucket: String,
    /// Function name, used for the archive name
    pub name: String,
}

/// Publishes function source so that Cloud Functions can fetch it
#[async_trait]
pub trait BundlePublisher: Send + Sync {
    /// Pack `source_dir` and upload it.
    ///
    /// Returns `{ sourceArchiveFilename, sourceArchiveUrl }`.
    async fn publish(
        &self,
        token: &str,
        target: &BundleTarget,
        source_dir: PathBuf,
    ) -> Result<Record>;

    /// Remove a published archive, best effort
    async fn unpublish(&self, token: &str, bucket: &str, filename: &str);
}

/// `<name>-<timestamp>.zip`
pub fn archive_filename(name: &str, now: DateTime<Utc>) -> String {
    let short = name.rsplit('/').next().unwrap_or(name);
    format!("{}-{}.zip", short, now.format("%Y%m%d%H%M%S"))
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Zip every file below `dir`, with paths relative to `dir`
pub fn pack_directory(dir: &Path) -> Result<Vec<u8>> {
    if !dir.is_dir() {
        return Err(FunctionError::BundleError(format!(
            "source code path is not a directory: {}",
            dir.display()
        )));
    }

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = entry.map_err(|e| FunctionError::BundleError(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| FunctionError::BundleError(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }

    let mut cursor = writer.finish()?;
    cursor.flush()?;
    Ok(cursor.into_inner())
}

/// Pack `dir` on the blocking pool
pub async fn pack(name: &str, dir: PathBuf) -> Result<SourceBundle> {
    let filename = archive_filename(name, Utc::now());
    tracing::debug!("Packing {} as {}", dir.display(), filename);

    let bytes = tokio::task::spawn_blocking(move || pack_directory(&dir))
        .await
        .map_err(|e| FunctionError::BundleError(e.to_string()))??;

    Ok(SourceBundle { filename, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;

    #[test]
    fn test_archive_filename() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(archive_filename("hello", now), "hello-20240309070501.zip");
        assert_eq!(
            archive_filename("projects/p/locations/l/functions/hello", now),
            "hello-20240309070501.zip"
        );
    }

    #[test]
    fn test_pack_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.js"), "exports.hello = () => {}").unwrap();
        std::fs::create_dir_all(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("lib/util.js"), "module.exports = {}").unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();

        let bytes = pack_directory(dir.path()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["index.js", "lib/", "lib/util.js"]);

        let mut content = String::new();
        archive
            .by_name("lib/util.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "module.exports = {}");
    }

    #[test]
    fn test_pack_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = pack_directory(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FunctionError::BundleError(_)));
    }
}
