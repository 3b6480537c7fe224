// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Confinement of relative paths to a root directory.
//!
//! Both the tool layer and the multi-file savers resolve model-supplied paths
//! through [`resolve_within`]. Resolution is purely lexical first (absolute
//! paths and `..` segments that climb above the root are refused), then every
//! existing component is inspected without following it. A symlink is only
//! accepted when its fully resolved target exists and lies inside the root, so
//! a dangling link cannot make a write create a file outside of it. No
//! filesystem mutation happens here.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Why a path was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    Empty,
    Absolute,
    EscapesRoot,
    SymlinkEscape,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ViolationReason::Empty => "path is empty or names the root itself",
            ViolationReason::Absolute => "absolute paths are not allowed",
            ViolationReason::EscapesRoot => "path climbs above the root directory",
            ViolationReason::SymlinkEscape => "path resolves through a symlink outside the root",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathViolation {
    pub path: String,
    pub reason: ViolationReason,
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path violation for '{}': {}", self.path, self.reason)
    }
}

impl std::error::Error for PathViolation {}

/// Lexically normalize `relative`, refusing anything that is not a strict descendant.
pub fn normalize_relative(relative: &str) -> Result<PathBuf, PathViolation> {
    let violation = |reason| PathViolation {
        path: relative.to_string(),
        reason,
    };

    if relative.trim().is_empty() {
        return Err(violation(ViolationReason::Empty));
    }

    // Reject both platform roots and the other platform's separator-led forms.
    let candidate = Path::new(relative);
    if candidate.is_absolute() || candidate.has_root() || relative.starts_with('\\') {
        return Err(violation(ViolationReason::Absolute));
    }

    let mut normalized = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(violation(ViolationReason::EscapesRoot));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(violation(ViolationReason::Absolute));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(violation(ViolationReason::Empty));
    }

    Ok(normalized)
}

/// Resolve `relative` beneath `root`, returning the absolute target path.
///
/// `root` should already be canonical; see [`canonical_root`].
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf, PathViolation> {
    let normalized = normalize_relative(relative)?;
    let target = root.join(&normalized);

    let mut current = root.to_path_buf();
    for part in normalized.components() {
        current.push(part);
        let meta = match std::fs::symlink_metadata(&current) {
            Ok(meta) => meta,
            Err(_) => break,
        };
        if meta.file_type().is_symlink() {
            match current.canonicalize() {
                Ok(real) if real.starts_with(root) => {}
                _ => {
                    return Err(PathViolation {
                        path: relative.to_string(),
                        reason: ViolationReason::SymlinkEscape,
                    })
                }
            }
        }
    }

    Ok(target)
}

/// Create `dir` if needed and return its canonical form.
pub fn canonical_root(dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    dir.canonicalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_traversal_payloads_rejected() {
        let payloads = vec![
            ("../outside.txt", ViolationReason::EscapesRoot),
            ("../../etc/passwd", ViolationReason::EscapesRoot),
            ("src/../../outside.txt", ViolationReason::EscapesRoot),
            ("./a/b/../../../x", ViolationReason::EscapesRoot),
            ("/etc/passwd", ViolationReason::Absolute),
            ("\\windows\\system32", ViolationReason::Absolute),
            ("", ViolationReason::Empty),
            ("   ", ViolationReason::Empty),
            (".", ViolationReason::Empty),
            ("a/..", ViolationReason::Empty),
        ];

        for (payload, expected) in payloads {
            let err = normalize_relative(payload).unwrap_err();
            assert_eq!(err.reason, expected, "payload {:?}", payload);
        }
    }

    #[test]
    fn test_inner_parent_segments_allowed() {
        assert_eq!(
            normalize_relative("src/../index.html").unwrap(),
            PathBuf::from("index.html")
        );
        assert_eq!(
            normalize_relative("./src/components/App.vue").unwrap(),
            PathBuf::from("src/components/App.vue")
        );
    }

    #[test]
    fn test_resolve_within_root() {
        let dir = TempDir::new().unwrap();
        let root = canonical_root(dir.path()).unwrap();

        let resolved = resolve_within(&root, "nested/dir/file.txt").unwrap();
        assert_eq!(resolved, root.join("nested/dir/file.txt"));
        assert!(!root.join("nested").exists(), "resolution must not create anything");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let root = canonical_root(dir.path()).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();

        let err = resolve_within(&root, "link/secret.txt").unwrap_err();
        assert_eq!(err.reason, ViolationReason::SymlinkEscape);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_escape_rejected() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let root = canonical_root(dir.path()).unwrap();
        let missing = outside.path().join("missing.txt");
        std::os::unix::fs::symlink(&missing, root.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone"), root.join("dir")).unwrap();

        for relative in ["link.txt", "dir/new.txt"] {
            let err = resolve_within(&root, relative).unwrap_err();
            assert_eq!(err.reason, ViolationReason::SymlinkEscape, "{}", relative);
        }
        assert!(!missing.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        let dir = TempDir::new().unwrap();
        let root = canonical_root(dir.path()).unwrap();
        std::fs::create_dir(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        let target = resolve_within(&root, "alias/page.html").unwrap();
        assert_eq!(target, root.join("alias/page.html"));
    }
}
