//! In-memory output files and their atomic placement on disk.

use std::path::{Component, Path, PathBuf};

use burnsub_common::error::{BurnError, BurnResult};

/// One output file, addressed by a `/`-separated relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Ordered files produced by one adapter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    entries: Vec<BundleEntry>,
}

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.push(BundleEntry {
            path: path.into(),
            bytes,
        });
    }

    pub fn push_text(&mut self, path: impl Into<String>, text: String) {
        self.push(path, text.into_bytes());
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.bytes.as_slice())
    }

    /// Entry contents as UTF-8, if present and valid.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Write every entry under `dest`.
    ///
    /// Files are staged in a temporary directory next to `dest` and moved
    /// into place only after all of them were written. `dest` must not
    /// exist, or be an empty directory. On failure nothing is left behind.
    pub fn write_to_dir(&self, dest: impl AsRef<Path>) -> BurnResult<PathBuf> {
        let dest = dest.as_ref();
        if dest.exists() {
            let empty_dir = dest.is_dir() && std::fs::read_dir(dest)?.next().is_none();
            if !empty_dir {
                return Err(BurnError::config(format!(
                    "Output directory {} already exists and is not empty",
                    dest.display()
                )));
            }
        }

        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".burnsub-")
            .tempdir_in(&parent)?;

        for entry in &self.entries {
            let relative = checked_relative(&entry.path)?;
            let target = staging.path().join(relative);
            if let Some(dir) = target.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&target, &entry.bytes)?;
        }

        place_staged(staging.path(), dest)?;
        let _ = staging.keep();

        tracing::info!(
            dest = %dest.display(),
            files = self.entries.len(),
            "Wrote output bundle"
        );
        Ok(dest.to_path_buf())
    }
}

/// Rename `staged` onto `dest`. An empty `dest` directory that the
/// platform refuses to replace is removed and the rename retried; if the
/// retry fails the empty directory is put back.
fn place_staged(staged: &Path, dest: &Path) -> std::io::Result<()> {
    let err = match std::fs::rename(staged, dest) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    let empty_dir =
        dest.is_dir() && std::fs::read_dir(dest).is_ok_and(|mut d| d.next().is_none());
    if !empty_dir || err.kind() == std::io::ErrorKind::NotFound {
        return Err(err);
    }

    std::fs::remove_dir(dest)?;
    std::fs::rename(staged, dest).map_err(|retry| {
        if let Err(restore) = std::fs::create_dir(dest) {
            tracing::warn!(dest = %dest.display(), "Could not restore output directory: {restore}");
        }
        retry
    })
}

fn checked_relative(path: &str) -> BurnResult<&Path> {
    let p = Path::new(path);
    let normal = p.components().all(|c| matches!(c, Component::Normal(_)));
    if path.is_empty() || !normal {
        return Err(BurnError::config(format!(
            "Bundle entry path must be relative and plain: {path:?}"
        )));
    }
    Ok(p)
}
