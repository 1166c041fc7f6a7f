//! File-system helpers shared by the stages that read and write artifacts.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Files directly inside `dir` whose extension is `extension`, sorted by file name.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Write `contents` to `path` in one step.
///
/// The bytes go to a temporary file next to `path` which is renamed over the
/// target once fully written; on error the target is left untouched.
pub fn write_artifact(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}
