use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counts of what a [`copy`] created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub dirs: usize,
}

/// Copy the contents of `src` into `dest`.
///
/// `dest` is created if missing. With `recursive`, subdirectories are mirrored
/// depth-first and always created, even when the filters leave them empty.
/// With non-empty `filters`, only files whose name contains one of the
/// filters are copied. Existing destination files are truncated and
/// overwritten. The first failure aborts the copy; files written before it
/// stay in place.
pub fn copy(
    src: &Path,
    dest: &Path,
    recursive: bool,
    filters: &[&str],
) -> Result<CopyStats, AssetError> {
    fs::create_dir_all(dest).map_err(|source| AssetError::Write {
        path: dest.to_path_buf(),
        source,
    })?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(src)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name();

    let mut stats = CopyStats::default();
    for entry in walker {
        let entry = entry.map_err(|err| AssetError::Read {
            path: err.path().unwrap_or(src).to_path_buf(),
            source: err
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop")),
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            if recursive {
                fs::create_dir_all(&target).map_err(|source| AssetError::Write {
                    path: target.clone(),
                    source,
                })?;
                stats.dirs += 1;
            }
            continue;
        }

        if !matches_filters(&entry.file_name().to_string_lossy(), filters) {
            continue;
        }

        copy_file(entry.path(), &target)?;
        stats.files += 1;
    }

    tracing::debug!(
        "copied {} files and {} dirs from {} to {}",
        stats.files,
        stats.dirs,
        src.display(),
        dest.display()
    );
    Ok(stats)
}

/// Remove a directory tree. A tree that is already gone counts as removed.
pub fn remove(dir: &Path) -> Result<(), AssetError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(AssetError::Write {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

fn matches_filters(name: &str, filters: &[&str]) -> bool {
    filters.is_empty() || filters.iter().any(|filter| name.contains(filter))
}

/// Both handles are dropped before this returns, on success or failure.
fn copy_file(from: &Path, to: &Path) -> Result<u64, AssetError> {
    let mut reader = File::open(from).map_err(|source| AssetError::Read {
        path: from.to_path_buf(),
        source,
    })?;
    let mut writer = File::create(to).map_err(|source| AssetError::Write {
        path: to.to_path_buf(),
        source,
    })?;
    let copy_err = |source| AssetError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    let bytes = io::copy(&mut reader, &mut writer).map_err(copy_err)?;
    writer.flush().map_err(copy_err)?;
    Ok(bytes)
}

/// Every file under `dir` keyed by relative path, with its contents.
#[cfg(test)]
pub fn snapshot(dir: &Path) -> std::collections::BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_copy_recursive_mirrors_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src.join("index.html"), "<html>");
        write(&src.join("css/glue.css"), "body{}");
        write(&src.join("zlink/js/main.bundle.js"), "var a=1;");
        let dest = tmp.path().join("out/nested");

        let stats = copy(&src, &dest, true, &[]).unwrap();

        assert_eq!(stats.files, 3);
        assert_eq!(stats.dirs, 3);
        assert_eq!(snapshot(&src), snapshot(&dest));
    }

    #[test]
    fn test_copy_with_filter_keeps_directories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("theme");
        write(&src.join("user.css"), "a{}");
        write(&src.join("color.ini"), "[Base]");
        write(&src.join("index.html"), "<html>");
        write(&src.join("assets/logo.png"), "png");
        fs::create_dir_all(src.join("empty")).unwrap();
        let dest = tmp.path().join("dest");

        copy(&src, &dest, true, &["user.css"]).unwrap();

        let copied = snapshot(&dest);
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[Path::new("user.css")], b"a{}");
        assert!(dest.join("assets").is_dir());
        assert!(dest.join("empty").is_dir());
        assert!(!dest.join("assets/logo.png").exists());
    }

    #[test]
    fn test_copy_non_recursive_skips_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src.join("top.txt"), "top");
        write(&src.join("sub/inner.txt"), "inner");
        let dest = tmp.path().join("dest");

        let stats = copy(&src, &dest, false, &[]).unwrap();

        assert_eq!(stats, CopyStats { files: 1, dirs: 0 });
        assert!(dest.join("top.txt").exists());
        assert!(!dest.join("sub").exists());
    }

    #[test]
    fn test_copy_overwrites_existing_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        write(&src.join("a.css"), "short");
        write(&dest.join("a.css"), "a much longer previous content");

        copy(&src, &dest, true, &[]).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.css")).unwrap(), "short");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let result = copy(&tmp.path().join("nope"), &tmp.path().join("dest"), true, &[]);
        assert!(matches!(result, Err(AssetError::Read { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_unwritable_destination_fails() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src.join("a.css"), "x");
        // A regular file where the destination directory should go.
        let dest = tmp.path().join("blocker");
        fs::write(&dest, "file").unwrap();

        let result = copy(&src, &dest, true, &[]);
        assert!(matches!(result, Err(AssetError::Write { .. })));
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let tmp = TempDir::new().unwrap();
        remove(&tmp.path().join("missing")).unwrap();

        let dir = tmp.path().join("present");
        write(&dir.join("x/y.txt"), "y");
        remove(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_matches_filters() {
        assert!(matches_filters("anything", &[]));
        assert!(matches_filters("user.css", &["user.css", "color.ini"]));
        assert!(matches_filters("old-user.css.bak", &["user.css"]));
        assert!(!matches_filters("index.html", &["user.css"]));
    }
}
