// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Directory helpers used by the code generator and the project builder.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Directories never copied into snapshots or build results.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

fn skipped(entry: &walkdir::DirEntry, extra: &[&str]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name) || extra.contains(&name))
            .unwrap_or(false)
}

/// Replace `dst` with a recursive copy of `src`.
///
/// Symlinks are not followed, so a link planted by generated code cannot pull
/// files from outside `src` into the build result.
pub fn replace_dir_with_copy(src: &Path, dst: &Path) -> io::Result<usize> {
    if dst.exists() {
        std::fs::remove_dir_all(dst)?;
    }
    std::fs::create_dir_all(dst)?;

    let mut copied = 0;
    for entry in WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !skipped(e, &[]))
    {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Read every UTF-8 file under `root` into a map keyed by `/`-separated relative path.
///
/// Files that are not valid UTF-8 are skipped; `exclude` names extra directories to skip.
pub fn snapshot_text_files(root: &Path, exclude: &[&str]) -> io::Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    if !root.exists() {
        return Ok(files);
    }

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !skipped(e, exclude))
    {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => {
                files.insert(key, content);
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::debug!(path = %key, "Skipping non UTF-8 file in snapshot");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/vue")).unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("src/main.js"), "main").unwrap();
        std::fs::write(dir.path().join("node_modules/vue/index.js"), "vue").unwrap();
        std::fs::write(dir.path().join("dist/index.html"), "built").unwrap();

        let files = snapshot_text_files(dir.path(), &["dist"]).unwrap();
        let keys: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["package.json", "src/main.js"]);
    }

    #[test]
    fn test_replace_dir_with_copy_is_stable() {
        let src = TempDir::new().unwrap();
        let dst_parent = TempDir::new().unwrap();
        let dst = dst_parent.path().join("deploy");
        std::fs::create_dir_all(src.path().join("assets")).unwrap();
        std::fs::write(src.path().join("index.html"), "<html></html>").unwrap();
        std::fs::write(src.path().join("assets/app.css"), "body{}").unwrap();

        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(dst.join("stale.txt"), "old").unwrap();

        let copied = replace_dir_with_copy(src.path(), &dst).unwrap();
        assert_eq!(copied, 2);
        assert!(!dst.join("stale.txt").exists());
        assert_eq!(std::fs::read_to_string(dst.join("assets/app.css")).unwrap(), "body{}");
    }
}
