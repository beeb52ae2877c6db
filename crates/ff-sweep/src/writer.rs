//! Filesystem side of case materialization.
//!
//! A case directory is complete when it holds `.complete` and no
//! `.incomplete`. `.complete` is a JSON manifest of the files written, which
//! the next run uses to prune files the sweep no longer produces.

use ff_core::{FfError, FfResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

pub const COMPLETE_MARKER: &str = ".complete";
pub const INCOMPLETE_MARKER: &str = ".incomplete";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseManifest {
    pub case: String,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Relative to the case directory, `/`-separated.
    pub path: String,
    pub sha256: String,
}

/// A file to write, relative to its case directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub executable: bool,
}

pub fn ensure_dir(dir: &Path) -> FfResult<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(FfError::write(dir, "exists and is not a directory"));
    }
    fs::create_dir_all(dir).map_err(|e| FfError::write(dir, e))
}

/// Write `bytes` unless the file already holds them. Returns whether the
/// file changed. New content goes through a temporary file and a rename.
pub fn write_if_changed(path: &Path, bytes: &[u8]) -> FfResult<bool> {
    if let Ok(existing) = fs::read(path)
        && existing == bytes
    {
        return Ok(false);
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| FfError::write(path, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));
    fs::write(&tmp, bytes).map_err(|e| FfError::write(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        FfError::write(path, e)
    })?;
    Ok(true)
}

#[cfg(unix)]
pub fn set_executable(path: &Path) -> FfResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .map_err(|e| FfError::write(path, e))?
        .permissions();
    if perms.mode() & 0o111 != 0o111 {
        perms.set_mode(perms.mode() | 0o755);
        fs::set_permissions(path, perms).map_err(|e| FfError::write(path, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> FfResult<()> {
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn manifest_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn read_manifest(dir: &Path) -> Option<CaseManifest> {
    let path = dir.join(COMPLETE_MARKER);
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable case manifest");
            None
        }
    }
}

/// Write every planned file under `dir`, prune files left over from the
/// previous manifest, then mark the directory complete.
pub fn write_case(dir: &Path, case: &str, files: &[PlannedFile]) -> FfResult<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let incomplete = dir.join(INCOMPLETE_MARKER);
    fs::write(&incomplete, "in progress\n").map_err(|e| FfError::write(&incomplete, e))?;
    let previous = read_manifest(dir);

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let target = dir.join(&file.path);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        write_if_changed(&target, &file.bytes)?;
        if file.executable {
            set_executable(&target)?;
        }
        entries.push(ManifestEntry {
            path: manifest_path(&file.path),
            sha256: sha256_hex(&file.bytes),
        });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    if let Some(previous) = previous {
        for old in previous.files {
            if entries.iter().any(|e| e.path == old.path) || !is_plain_relative(&old.path) {
                continue;
            }
            let stale = dir.join(&old.path);
            match fs::remove_file(&stale) {
                Ok(()) => {
                    warn!(path = %stale.display(), "removed file no longer produced by the sweep");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(FfError::write(&stale, e)),
            }
        }
    }

    let manifest = CaseManifest {
        case: case.to_string(),
        files: entries,
    };
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| FfError::write(dir.join(COMPLETE_MARKER), e))?;
    write_if_changed(&dir.join(COMPLETE_MARKER), json.as_bytes())?;
    fs::remove_file(&incomplete).map_err(|e| FfError::write(&incomplete, e))?;

    Ok(files.iter().map(|f| f.path.clone()).collect())
}

/// Record a failure in the case directory, if it can be created at all.
pub fn mark_incomplete(dir: &Path, reason: &str) {
    let marker = dir.join(INCOMPLETE_MARKER);
    let written = fs::create_dir_all(dir).and_then(|()| fs::write(&marker, format!("{reason}\n")));
    if let Err(e) = written {
        warn!(path = %marker.display(), error = %e, "could not record case failure");
    }
}

pub fn is_complete(dir: &Path) -> bool {
    dir.join(COMPLETE_MARKER).is_file() && !dir.join(INCOMPLETE_MARKER).exists()
}

fn is_plain_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("ff-sweep-writer-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn planned(path: &str, text: &str) -> PlannedFile {
        PlannedFile {
            path: PathBuf::from(path),
            bytes: text.as_bytes().to_vec(),
            executable: false,
        }
    }

    #[test]
    fn write_if_changed_skips_identical_content() {
        let dir = scratch("changed");
        ensure_dir(&dir).unwrap();
        let path = dir.join("a.dat");
        assert!(write_if_changed(&path, b"one").unwrap());
        assert!(!write_if_changed(&path, b"one").unwrap());
        assert!(write_if_changed(&path, b"two").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"two");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_case_marks_complete_and_prunes() {
        let dir = scratch("prune");
        write_case(&dir, "c", &[planned("a.dat", "a"), planned("sub/b.dat", "b")]).unwrap();
        assert!(is_complete(&dir));
        assert!(dir.join("sub/b.dat").is_file());

        write_case(&dir, "c", &[planned("a.dat", "a")]).unwrap();
        assert!(is_complete(&dir));
        assert!(!dir.join("sub/b.dat").exists());

        let manifest = read_manifest(&dir).unwrap();
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.files[0].sha256, sha256_hex(b"a"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn directory_blocked_by_file_is_write_error() {
        let dir = scratch("blocked");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("case"), "not a dir").unwrap();
        let err = write_case(&dir.join("case"), "c", &[planned("a.dat", "a")]).unwrap_err();
        assert!(matches!(err, FfError::Write { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failure_marker_holds_the_reason() {
        let dir = scratch("marker");
        mark_incomplete(&dir, "template render failed");
        assert_eq!(
            fs::read_to_string(dir.join(INCOMPLETE_MARKER)).unwrap(),
            "template render failed\n"
        );
        assert!(!is_complete(&dir));

        // a file in the way is logged, never a panic
        let blocked = dir.join("blocked");
        fs::write(&blocked, "x").unwrap();
        mark_incomplete(&blocked, "unused");
        assert!(blocked.is_file());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn manifest_paths_never_escape() {
        assert!(is_plain_relative("TurbSim/Low.inp"));
        assert!(!is_plain_relative("../outside.dat"));
        assert!(!is_plain_relative("/etc/passwd"));
    }
}
