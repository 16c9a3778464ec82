//! Zip packaging of a generated guide tree.
//!
//! Entry names are the `/`-separated paths relative to the root that was
//! walked. Only regular files become entries. Entries are added in sorted
//! order with a fixed 1980-01-01 timestamp, so the same tree always yields
//! the same bytes.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use guidegen_shared::{GuideError, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Build a deflate-compressed zip of every file under `root`.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn build(root: &Path) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = 0usize;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GuideError::Archive(format!("walking {}: {e}", root.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry_name(root, entry.path())?;
        let data = fs::read(entry.path()).map_err(|e| GuideError::io(entry.path(), e))?;

        zip.start_file(name.as_str(), options)
            .map_err(|e| GuideError::Archive(format!("{name}: {e}")))?;
        zip.write_all(&data)
            .map_err(|e| GuideError::Archive(format!("{name}: {e}")))?;

        debug!(entry = %name, bytes = data.len(), "archived");
        entries += 1;
    }

    let bytes = zip
        .finish()
        .map_err(|e| GuideError::Archive(format!("finalizing archive: {e}")))?
        .into_inner();

    info!(entries, bytes = bytes.len(), "archive built");
    Ok(bytes)
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| GuideError::Archive(format!("{} is outside {}", path.display(), root.display())))?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn guide_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let base = "site/sfguides/src/demo-guide";
        write(dir.path(), &format!("{base}/demo-guide.md"), b"# Demo\n");
        write(dir.path(), &format!("{base}/assets/diagram.png"), b"\x89PNG");
        write(dir.path(), &format!("{base}/assets/setup.sql"), b"select 1;");
        dir
    }

    #[test]
    fn every_file_becomes_an_entry() {
        let dir = guide_tree();
        let bytes = build(dir.path()).unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "site/sfguides/src/demo-guide/assets/diagram.png",
                "site/sfguides/src/demo-guide/assets/setup.sql",
                "site/sfguides/src/demo-guide/demo-guide.md",
            ]
        );
    }

    #[test]
    fn contents_survive_compression() {
        let dir = guide_tree();
        let bytes = build(dir.path()).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive
            .by_name("site/sfguides/src/demo-guide/assets/setup.sql")
            .unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);

        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "select 1;");
    }

    #[test]
    fn empty_directories_are_not_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        write(dir.path(), "a/file.txt", b"x");

        let archive = ZipArchive::new(Cursor::new(build(dir.path()).unwrap())).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.file_names().next(), Some("a/file.txt"));
    }

    #[test]
    fn identical_trees_give_identical_bytes() {
        let first = build(guide_tree().path()).unwrap();
        let second = build(guide_tree().path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(sha256_hex(&first), sha256_hex(&second));
    }

    #[test]
    fn sha256_hex_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
