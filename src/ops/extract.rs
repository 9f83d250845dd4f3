//! Tarball extraction into a staging directory.
//!
//! Extraction never writes into a live prefix: the caller extracts into a
//! staging directory and swaps it into place afterwards. Any entry that
//! would resolve outside the destination (absolute path or `..` component)
//! aborts the whole extraction.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use walkdir::WalkDir;

use crate::core::errors::InstallError;

/// Extract a gzip-compressed tarball into `dest`.
///
/// Release tarballs (GitHub layout) wrap everything in a single
/// `name-version/` directory; when the archive has exactly one top-level
/// directory and nothing else, its contents are promoted to `dest` so the
/// prefix holds `bin/`, `lib/`, ... directly. The tree is then filtered
/// against the install glob `patterns` (`*` keeps everything).
pub fn extract_archive(
    data: &[u8],
    dest: &Path,
    patterns: &[String],
) -> Result<(), InstallError> {
    let decoder = GzDecoder::new(Cursor::new(data));
    let mut archive = Archive::new(decoder);

    std::fs::create_dir_all(dest).map_err(|e| InstallError::Extraction {
        reason: format!("failed to create {}: {}", dest.display(), e),
    })?;

    let entries = archive.entries().map_err(|e| InstallError::Extraction {
        reason: format!("malformed archive: {}", e),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| InstallError::Extraction {
            reason: format!("malformed archive entry: {}", e),
        })?;

        let entry_path = entry
            .path()
            .map_err(|e| InstallError::Extraction {
                reason: format!("bad entry path: {}", e),
            })?
            .into_owned();

        check_entry_path(&entry_path)?;
        let output_path = dest.join(&entry_path);

        let entry_type = entry.header().entry_type();
        match entry_type {
            tar::EntryType::Directory => {
                std::fs::create_dir_all(&output_path).map_err(|e| InstallError::Extraction {
                    reason: format!("failed to create {}: {}", output_path.display(), e),
                })?;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                if let Some(parent) = output_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| InstallError::Extraction {
                        reason: format!("failed to create {}: {}", parent.display(), e),
                    })?;
                }
                entry
                    .unpack(&output_path)
                    .map_err(|e| InstallError::Extraction {
                        reason: format!("failed to extract {}: {}", entry_path.display(), e),
                    })?;
            }
            tar::EntryType::Link => {
                let target = entry.link_name().ok().flatten().ok_or_else(|| {
                    InstallError::Extraction {
                        reason: format!("hard link without a target: {}", entry_path.display()),
                    }
                })?;
                check_entry_path(&target)?;
                if let Some(parent) = output_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| InstallError::Extraction {
                        reason: format!("failed to create {}: {}", parent.display(), e),
                    })?;
                }
                // Link targets name other archive entries; resolve them
                // against the extraction root, not the process cwd.
                std::fs::hard_link(dest.join(&target), &output_path).map_err(|e| {
                    InstallError::Extraction {
                        reason: format!(
                            "failed to create hard link {}: {}",
                            output_path.display(),
                            e
                        ),
                    }
                })?;
            }
            tar::EntryType::Symlink => {
                #[cfg(unix)]
                {
                    if let Ok(Some(target)) = entry.link_name() {
                        check_entry_path(&target)?;
                        if let Some(parent) = output_path.parent() {
                            std::fs::create_dir_all(parent).map_err(|e| {
                                InstallError::Extraction {
                                    reason: format!("failed to create {}: {}", parent.display(), e),
                                }
                            })?;
                        }
                        std::os::unix::fs::symlink(target.as_ref(), &output_path).map_err(
                            |e| InstallError::Extraction {
                                reason: format!(
                                    "failed to create symlink {}: {}",
                                    output_path.display(),
                                    e
                                ),
                            },
                        )?;
                    }
                }
                #[cfg(not(unix))]
                tracing::debug!("skipping symlink entry: {}", entry_path.display());
            }
            _ => {
                // fifos, devices, etc. have no business in a release tarball
                tracing::debug!(
                    "skipping unsupported entry type {:?}: {}",
                    entry_type,
                    entry_path.display()
                );
            }
        }
    }

    collapse_single_root(dest)?;
    apply_patterns(dest, patterns)?;

    Ok(())
}

/// Reject absolute paths and `..` components.
fn check_entry_path(path: &Path) -> Result<(), InstallError> {
    for component in path.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::Extraction {
                    reason: format!("entry escapes destination directory: {}", path.display()),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// If `dest` holds exactly one directory and nothing else, promote its
/// contents one level up. This strips the `name-version/` wrapper of
/// release tarballs.
fn collapse_single_root(dest: &Path) -> Result<(), InstallError> {
    let entries: Vec<_> = std::fs::read_dir(dest)
        .map_err(|e| InstallError::Extraction {
            reason: format!("failed to read {}: {}", dest.display(), e),
        })?
        .collect::<Result<_, _>>()
        .map_err(|e| InstallError::Extraction {
            reason: e.to_string(),
        })?;

    if entries.len() != 1 || !entries[0].path().is_dir() {
        return Ok(());
    }

    let root = entries[0].path();
    for child in std::fs::read_dir(&root).map_err(|e| InstallError::Extraction {
        reason: format!("failed to read {}: {}", root.display(), e),
    })? {
        let child = child.map_err(|e| InstallError::Extraction {
            reason: e.to_string(),
        })?;
        let target = dest.join(child.file_name());
        std::fs::rename(child.path(), &target).map_err(|e| InstallError::Extraction {
            reason: format!("failed to move {}: {}", child.path().display(), e),
        })?;
    }

    std::fs::remove_dir(&root).map_err(|e| InstallError::Extraction {
        reason: format!("failed to remove {}: {}", root.display(), e),
    })?;

    Ok(())
}

/// Drop files not selected by the install glob patterns.
///
/// A pattern selects a file when it matches the file's path relative to
/// `dest` or any ancestor directory of that path, so `bin` keeps everything
/// under `bin/` while `bin/*` and `bi*` behave as the globs they look like.
/// Directories left empty by the filter are pruned.
fn apply_patterns(dest: &Path, patterns: &[String]) -> Result<(), InstallError> {
    if patterns.iter().any(|p| p == "*") {
        return Ok(());
    }

    let compiled = patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| InstallError::Extraction {
                reason: format!("invalid install pattern `{}`: {}", p, e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let selected = |rel: &Path| {
        rel.ancestors()
            .filter(|a| !a.as_os_str().is_empty())
            .any(|a| compiled.iter().any(|pat| pat.matches_path(a)))
    };

    let files: Vec<PathBuf> = WalkDir::new(dest)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect();
    for path in files {
        let rel = match path.strip_prefix(dest) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if selected(rel) {
            continue;
        }
        std::fs::remove_file(&path).map_err(|e| InstallError::Extraction {
            reason: format!("failed to drop unselected entry {}: {}", path.display(), e),
        })?;
    }

    // Prune emptied directories, deepest first
    let mut dirs: Vec<PathBuf> = WalkDir::new(dest)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect();
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in dirs {
        let is_empty = std::fs::read_dir(&dir)
            .map(|mut it| it.next().is_none())
            .unwrap_or(false);
        if is_empty {
            std::fs::remove_dir(&dir).map_err(|e| InstallError::Extraction {
                reason: format!("failed to drop unselected entry {}: {}", dir.display(), e),
            })?;
        }
    }

    Ok(())
}

/// List all files under `root`, as paths relative to it, sorted.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(root).ok().map(|p| p.to_path_buf()))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Build a gzipped tarball in memory from (path, contents) pairs.
    /// Paths ending in `/` become directory entries.
    fn make_tarball(entries: &[(&str, &str)]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use tar::Builder;

        let mut tar_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut tar_data, Compression::default());
            let mut builder = Builder::new(encoder);

            for (path, contents) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_path(path).unwrap();
                if path.ends_with('/') {
                    header.set_size(0);
                    header.set_mode(0o755);
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_cksum();
                    builder.append(&header, std::io::empty()).unwrap();
                } else {
                    header.set_size(contents.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();
                    builder
                        .append(&header, Cursor::new(contents.as_bytes()))
                        .unwrap();
                }
            }

            builder.finish().unwrap();
        }
        tar_data
    }

    fn all() -> Vec<String> {
        vec!["*".to_string()]
    }

    #[test]
    fn test_extract_basic() {
        let data = make_tarball(&[("test.txt", "hello")]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        extract_archive(&data, &dest, &all()).unwrap();
        assert_eq!(std::fs::read_to_string(dest.join("test.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_extract_collapses_single_root() {
        let data = make_tarball(&[
            ("mytool-1.0.0/", ""),
            ("mytool-1.0.0/bin/", ""),
            ("mytool-1.0.0/bin/mytool", "#!/bin/sh\n"),
            ("mytool-1.0.0/README.md", "docs"),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        extract_archive(&data, &dest, &all()).unwrap();
        assert!(dest.join("bin/mytool").exists());
        assert!(dest.join("README.md").exists());
        assert!(!dest.join("mytool-1.0.0").exists());
    }

    #[test]
    fn test_extract_keeps_multiple_roots() {
        let data = make_tarball(&[("a.txt", "a"), ("b.txt", "b")]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        extract_archive(&data, &dest, &all()).unwrap();
        assert!(dest.join("a.txt").exists());
        assert!(dest.join("b.txt").exists());
    }

    #[test]
    fn test_extract_rejects_parent_traversal() {
        // `Header::set_path` refuses `..`, so write the name bytes directly
        // the way a hostile archive would.
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use tar::Builder;

        let mut data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut data, Compression::default());
            let mut builder = Builder::new(encoder);

            let mut header = tar::Header::new_gnu();
            let name = b"../../etc/evil";
            header.as_old_mut().name[..name.len()].copy_from_slice(name);
            header.set_size(4);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, Cursor::new(&b"boom"[..])).unwrap();
            builder.finish().unwrap();
        }

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        let err = extract_archive(&data, &dest, &all()).unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
        // Nothing escaped the destination
        assert!(!tmp.path().join("etc/evil").exists());
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        let err = extract_archive(b"definitely not gzip", &dest, &all()).unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
    }

    #[test]
    fn test_extract_applies_patterns() {
        let data = make_tarball(&[
            ("mytool-1.0.0/", ""),
            ("mytool-1.0.0/bin/", ""),
            ("mytool-1.0.0/bin/mytool", "#!/bin/sh\n"),
            ("mytool-1.0.0/tests/", ""),
            ("mytool-1.0.0/tests/fixtures.txt", "x"),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        extract_archive(&data, &dest, &["bin".to_string()]).unwrap();
        assert!(dest.join("bin/mytool").exists());
        assert!(!dest.join("tests").exists());
    }

    #[test]
    fn test_patterns_accept_globs() {
        let data = make_tarball(&[
            ("mytool-1.0.0/", ""),
            ("mytool-1.0.0/bin/", ""),
            ("mytool-1.0.0/bin/mytool", "#!/bin/sh\n"),
            ("mytool-1.0.0/README.md", "docs"),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        // `bi*` must match the `bin` directory, not nothing
        extract_archive(&data, &dest, &["bi*".to_string()]).unwrap();
        assert!(dest.join("bin/mytool").exists());
        assert!(!dest.join("README.md").exists());
    }

    #[test]
    fn test_patterns_select_by_path() {
        let data = make_tarball(&[
            ("mytool-1.0.0/", ""),
            ("mytool-1.0.0/bin/", ""),
            ("mytool-1.0.0/bin/mytool", "#!/bin/sh\n"),
            ("mytool-1.0.0/README.md", "docs"),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        extract_archive(&data, &dest, &["bin/*".to_string()]).unwrap();
        assert!(dest.join("bin/mytool").exists());
        assert!(!dest.join("README.md").exists());
    }

    #[test]
    fn test_invalid_pattern_is_extraction_error() {
        let data = make_tarball(&[("a.txt", "a")]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        let err = extract_archive(&data, &dest, &["[".to_string()]).unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
    }

    #[test]
    fn test_extract_hard_link() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use tar::Builder;

        let mut data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut data, Compression::default());
            let mut builder = Builder::new(encoder);

            let contents = "shared";
            let mut header = tar::Header::new_gnu();
            header.set_path("orig.txt").unwrap();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append(&header, Cursor::new(contents.as_bytes()))
                .unwrap();

            let mut header = tar::Header::new_gnu();
            header.set_path("copy.txt").unwrap();
            header.set_link_name("orig.txt").unwrap();
            header.set_size(0);
            header.set_mode(0o644);
            header.set_entry_type(tar::EntryType::Link);
            header.set_cksum();
            builder.append(&header, std::io::empty()).unwrap();

            builder.finish().unwrap();
        }

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        extract_archive(&data, &dest, &all()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dest.join("copy.txt")).unwrap(),
            "shared"
        );
    }

    #[test]
    fn test_list_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("bin")).unwrap();
        std::fs::write(tmp.path().join("bin/tool"), "x").unwrap();
        std::fs::write(tmp.path().join("README.md"), "y").unwrap();

        let files = list_files(tmp.path());
        assert_eq!(
            files,
            vec![PathBuf::from("README.md"), PathBuf::from("bin/tool")]
        );
    }
}
