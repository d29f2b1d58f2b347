//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Whether a walked entry is a symbolic link to a directory. Such links are
/// neither followed nor copied.
pub fn is_dir_link(entry: &walkdir::DirEntry) -> bool {
    entry.path_is_symlink() && entry.path().is_dir()
}

/// Recursively copy a directory, skipping every entry (file or directory)
/// for which `skip` returns true. Skipped directories are not descended into.
///
/// Returns the number of files copied.
pub fn copy_dir_filtered<F>(src: &Path, dst: &Path, skip: F) -> Result<usize>
where
    F: Fn(&Path) -> bool,
{
    ensure_dir(dst)?;

    let mut copied = 0;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !skip(e.path()));

    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} escaped {}", entry.path().display(), src.display()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if is_dir_link(&entry) {
            tracing::debug!("skipping directory link {}", entry.path().display());
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy a single file, creating the destination's parent directories.
///
/// Permission bits are carried over with the contents.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    tracing::debug!("copied {} -> {}", src.display(), dst.display());

    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file, if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove file: {}", path.display())),
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
///
/// Any existing file is truncated.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write lines to a file, each terminated by a newline.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut contents = lines.join("\n");
    contents.push('\n');
    write_string(path, &contents)
}

/// Set the Unix permission bits of a file. A no-op elsewhere.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Get the Unix permission bits of a file, if the platform has them.
#[cfg(unix)]
pub fn mode(path: &Path) -> Result<Option<u32>> {
    use std::os::unix::fs::PermissionsExt;

    let meta =
        fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    Ok(Some(meta.permissions().mode()))
}

#[cfg(not(unix))]
pub fn mode(_path: &Path) -> Result<Option<u32>> {
    Ok(None)
}

/// Sorted names of the entries of a directory.
pub fn sorted_dir_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    names.sort();
    Ok(names)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Join a `/` separated relative name onto a directory using the platform's
/// separator.
pub fn join_slashed(base: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|c| !c.is_empty())
        .fold(base.to_path_buf(), |path, c| path.join(c))
}

/// Render a path with `/` separators whatever the platform.
pub fn to_slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_filtered() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("keep")).unwrap();
        fs::create_dir_all(src.join("skip")).unwrap();
        fs::write(src.join("keep/file.txt"), "content").unwrap();
        fs::write(src.join("skip/file.txt"), "content").unwrap();
        fs::write(src.join("lib.prl"), "prl").unwrap();

        let copied = copy_dir_filtered(&src, &dst, |p| {
            p.ends_with("skip") || p.extension().is_some_and(|e| e == "prl")
        })
        .unwrap();

        assert_eq!(copied, 1);
        assert_eq!(fs::read_to_string(dst.join("keep/file.txt")).unwrap(), "content");
        assert!(!dst.join("skip").exists());
        assert!(!dst.join("lib.prl").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_skips_directory_links() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("QtCore.framework");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("Versions/A")).unwrap();
        fs::write(src.join("Versions/A/QtCore"), "lib").unwrap();
        std::os::unix::fs::symlink("A", src.join("Versions/Current")).unwrap();
        std::os::unix::fs::symlink("Versions/A/QtCore", src.join("QtCore")).unwrap();

        let copied = copy_dir_filtered(&src, &dst, |_| false).unwrap();

        assert_eq!(copied, 2);
        assert!(dst.join("Versions/A/QtCore").is_file());
        assert_eq!(fs::read_to_string(dst.join("QtCore")).unwrap(), "lib");
        assert!(!dst.join("Versions/Current").exists());
    }

    #[test]
    fn test_remove_file_if_exists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");

        remove_file_if_exists(&path).unwrap();

        fs::write(&path, "all:").unwrap();
        remove_file_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_write_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sub/QtCore.pro");

        write_lines(&path, &["TEMPLATE = lib".to_string(), "TARGET = QtCore".to_string()])
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "TEMPLATE = lib\nTARGET = QtCore\n"
        );
    }

    #[test]
    fn test_join_slashed() {
        let joined = join_slashed(Path::new("qt"), "lib/QtCore.framework/Resources");
        assert_eq!(
            joined,
            Path::new("qt").join("lib").join("QtCore.framework").join("Resources")
        );
        assert_eq!(to_slashed(&joined), "qt/lib/QtCore.framework/Resources");
    }

    #[test]
    fn test_sorted_dir_names() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b"), "").unwrap();
        fs::write(tmp.path().join("a"), "").unwrap();

        assert_eq!(sorted_dir_names(tmp.path()).unwrap(), vec!["a", "b"]);
    }
}
