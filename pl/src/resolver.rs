//! Partial source directory resolution

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::fs::FileSystem;
use crate::options::contains_root_sentinel;

/// Directories under `root` to load partials from
///
/// When `names` contains `.` the root itself is the only source and nothing
/// is read from disk. Otherwise every directory below the root whose name
/// matches exactly is returned, nested matches included.
///
/// A missing root is deliberately treated differently in the two modes: the
/// name search finds nothing and returns an empty list, while the sentinel
/// hands the root to the walker unchecked, so loading then fails with an
/// I/O error for that root.
pub fn resolve_source_dirs<F: FileSystem + ?Sized>(fs: &F, root: &Path, names: &[String]) -> io::Result<Vec<PathBuf>> {
    debug!(?root, ?names, "resolve_source_dirs: called");
    if contains_root_sentinel(names) {
        debug!("resolve_source_dirs: sentinel present, using root");
        return Ok(vec![root.to_path_buf()]);
    }

    let dirs = fs.find_dirs_named(root, names)?;
    debug!(count = dirs.len(), "resolve_source_dirs: complete");
    Ok(dirs)
}
