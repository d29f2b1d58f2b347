//! Wheel names, contents and RECORD files.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::bundle::errors::BundleError;
use crate::util::fs::{
    ensure_dir, join_slashed, mode, relative_path, remove_file_if_exists, set_mode,
    sorted_dir_names, to_slashed, write_string,
};
use crate::util::hash::record_digest_file;

/// The parsed file name of a wheel, less any build tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    pub distribution: String,
    pub version: String,
    pub python: String,
    pub abi: String,
    pub platform: String,
    pub unlicensed: bool,
}

impl WheelName {
    /// Parse a file name such as `PyQt6-6.5.0-cp37-abi3-manylinux_2_28_x86_64.whl`.
    /// An existing build tag is dropped.
    pub fn parse(file_name: &str) -> Result<Self> {
        let naming = || BundleError::Naming {
            name: file_name.to_string(),
        };

        let stem = file_name.strip_suffix(".whl").ok_or_else(naming)?;
        let mut parts: Vec<&str> = stem.split('-').collect();

        let unlicensed = parts.last() == Some(&"unlicensed");
        if unlicensed {
            parts.pop();
        }

        match parts.len() {
            6 => {
                parts.remove(2);
            }
            5 => {}
            _ => return Err(naming().into()),
        }

        if parts.iter().any(|p| p.is_empty()) {
            return Err(naming().into());
        }

        Ok(WheelName {
            distribution: parts[0].to_string(),
            version: parts[1].to_string(),
            python: parts[2].to_string(),
            abi: parts[3].to_string(),
            platform: parts[4].to_string(),
            unlicensed,
        })
    }

    /// The file name with a build tag inserted.
    pub fn file_name(&self, build_tag: Option<&str>) -> String {
        let mut parts = vec![self.distribution.as_str(), self.version.as_str()];
        parts.extend(build_tag);
        parts.extend([self.python.as_str(), self.abi.as_str(), self.platform.as_str()]);
        if self.unlicensed {
            parts.push("unlicensed");
        }

        format!("{}.whl", parts.join("-"))
    }

    /// The file name without its extension or any `unlicensed` marker, used
    /// for the scratch directory.
    pub fn stem(&self, build_tag: Option<&str>) -> String {
        let licensed = WheelName {
            unlicensed: false,
            ..self.clone()
        };
        let name = licensed.file_name(build_tag);
        name.trim_end_matches(".whl").to_string()
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name(None))
    }
}

/// Unpack a wheel into `dest`, restoring each entry's permission bits.
pub fn unpack(wheel: &Path, dest: &Path) -> Result<()> {
    let file =
        File::open(wheel).with_context(|| format!("unable to find '{}'", wheel.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("'{}' is not a valid wheel", wheel.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("failed to read entry {} of {}", i, wheel.display()))?;

        let Some(name) = entry.enclosed_name() else {
            bail!("'{}' contains the unsafe path '{}'", wheel.display(), entry.name());
        };
        let path = dest.join(name);

        if entry.is_dir() {
            ensure_dir(&path)?;
            continue;
        }

        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let mut out =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract {}", path.display()))?;

        if let Some(mode) = entry.unix_mode().map(|m| m & 0o7777).filter(|m| *m != 0) {
            set_mode(&path, mode)?;
        }
    }

    Ok(())
}

/// Find the `.dist-info` directory at the top of an unpacked wheel.
pub fn find_dist_info(root: &Path, wheel: &Path) -> Result<String> {
    sorted_dir_names(root)?
        .into_iter()
        .find(|name| name.ends_with(".dist-info") && root.join(name).is_dir())
        .ok_or_else(|| {
            BundleError::MissingDistInfo {
                wheel: wheel.to_path_buf(),
            }
            .into()
        })
}

/// Walk a directory top-down the way RECORD lists it: each directory's
/// files in name order, then its subdirectories in name order.
fn record_order(root: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
}

/// Write `<dist_info>/RECORD` for everything under `root`, replacing any
/// existing one. Returns the recorded names, RECORD itself last.
pub fn write_record(root: &Path, dist_info: &str) -> Result<Vec<String>> {
    let record_name = format!("{}/RECORD", dist_info);
    let record_path = join_slashed(root, &record_name);
    remove_file_if_exists(&record_path)?;

    let mut names = Vec::new();
    let mut lines = String::new();

    for entry in record_order(root) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let name = to_slashed(&relative_path(root, entry.path()));
        let digest = record_digest_file(entry.path())?;

        lines.push_str(&format!("{},sha256={},{}\n", name, digest.digest, digest.size));
        names.push(name);
    }

    lines.push_str(&format!("{},,\n", record_name));
    names.push(record_name);

    write_string(&record_path, &lines)?;

    Ok(names)
}

/// Create a wheel from the named files under `root`, in the order given.
///
/// Entries are deflated and carry a fixed timestamp so that the same
/// contents always produce the same archive.
pub fn create_wheel(root: &Path, names: &[String], wheel: &Path) -> Result<()> {
    let file = File::create(wheel)
        .with_context(|| format!("failed to create {}", wheel.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for name in names {
        let path = join_slashed(root, name);
        let permissions = mode(&path)?.map_or(0o644, |m| m & 0o7777);

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(permissions);

        zip.start_file(name.as_str(), options)
            .with_context(|| format!("failed to add {} to {}", name, wheel.display()))?;

        let mut src =
            File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        io::copy(&mut src, &mut zip)
            .with_context(|| format!("failed to add {} to {}", name, wheel.display()))?;
    }

    zip.finish()
        .with_context(|| format!("failed to write {}", wheel.display()))?;

    tracing::debug!("wrote {} ({} entries)", wheel.display(), names.len());
    Ok(())
}

/// Record `root` and pack it as `wheel`.
///
/// The archive is written next to its final name and renamed into place, so
/// a failure never leaves a partial wheel behind.
pub fn pack(root: &Path, dist_info: &str, wheel: &Path) -> Result<()> {
    let names = write_record(root, dist_info)?;

    let mut partial = wheel.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = create_wheel(root, &names, &partial) {
        remove_file_if_exists(&partial)?;
        return Err(e);
    }

    fs::rename(&partial, wheel)
        .with_context(|| format!("failed to move {} into place", wheel.display()))
}

/// Set the `Build:` line of a WHEEL file, adding one if there is none.
pub fn set_build_tag(wheel_file: &str, build_tag: &str) -> String {
    let build = format!("Build: {}", build_tag);
    let mut found = false;

    let mut lines: Vec<String> = wheel_file
        .lines()
        .map(|line| {
            if line.starts_with("Build:") {
                found = true;
                build.clone()
            } else {
                line.to_string()
            }
        })
        .collect();

    if !found {
        lines.push(build);
    }

    lines.join("\n") + "\n"
}

/// Replace the platform of every `Tag:` line of a WHEEL file.
pub fn set_platform_tag(wheel_file: &str, platform: &str) -> String {
    let lines: Vec<String> = wheel_file
        .lines()
        .map(|line| match line.strip_prefix("Tag:") {
            Some(tag) => {
                let tag = tag.trim();
                match tag.rsplit_once('-') {
                    Some((interpreter_abi, _)) => format!("Tag: {}-{}", interpreter_abi, platform),
                    None => line.to_string(),
                }
            }
            None => line.to_string(),
        })
        .collect();

    lines.join("\n") + "\n"
}

/// Remove the `Requires-Dist` lines of a METADATA file naming `project`.
/// Returns `None` if there were none.
pub fn strip_requirement(metadata: &str, project: &str) -> Option<String> {
    let project = normalize_project_name(project);
    let mut stripped = false;
    let mut kept = String::with_capacity(metadata.len());

    for line in metadata.split_inclusive('\n') {
        let requires = line
            .strip_prefix("Requires-Dist:")
            .map(|req| requirement_name(req.trim()));

        if requires.is_some_and(|name| normalize_project_name(name) == project) {
            stripped = true;
        } else {
            kept.push_str(line);
        }
    }

    stripped.then_some(kept)
}

/// The project name at the start of a requirement such as
/// `PyQt6-Qt6 (>=6.5.0)` or `PyQt6-Qt6>=6.5.0; python_version >= "3.8"`.
fn requirement_name(requirement: &str) -> &str {
    let end = requirement
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(requirement.len());

    &requirement[..end]
}

/// Project names compare case-insensitively with runs of `-`, `_` and `.`
/// treated as equal.
fn normalize_project_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            separator = true;
        } else {
            if separator && !normalized.is_empty() {
                normalized.push('-');
            }
            separator = false;
            normalized.push(c.to_ascii_lowercase());
        }
    }

    normalized
}
