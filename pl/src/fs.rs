//! Filesystem capability used by the loader
//!
//! The loader never calls `std::fs` directly; it goes through `FileSystem`
//! so traversal can be observed or replaced in tests.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Kind of a directory entry as seen by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Dangling symlinks, sockets, devices and anything else skipped
    Other,
}

/// A single directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: OsString,
    pub kind: EntryKind,
}

/// Blocking filesystem operations needed to discover partials
pub trait FileSystem {
    /// List the entries of a directory in a stable order
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read a whole file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Resolve `path` through any symlinks
    ///
    /// Used to detect directory cycles. Filesystems without links can keep
    /// the default, which returns the path unchanged.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }

    /// Find every directory strictly below `root` whose name is in `names`
    ///
    /// Results are in pre-order. Symlinked directories are followed; a link
    /// back to one of its own ancestors is an error. A missing root yields
    /// no results.
    fn find_dirs_named(&self, root: &Path, names: &[String]) -> io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        if self.is_dir(root) {
            collect_dirs_named(self, root, names, &mut found, &mut Vec::new())?;
        }
        Ok(found)
    }
}

/// Error for a directory that resolves to one of its own ancestors
pub(crate) fn filesystem_loop(dir: &Path, target: &Path) -> io::Error {
    io::Error::other(format!(
        "filesystem loop: {} points back to {}",
        dir.display(),
        target.display()
    ))
}

fn collect_dirs_named<F: FileSystem + ?Sized>(
    fs: &F,
    dir: &Path,
    names: &[String],
    found: &mut Vec<PathBuf>,
    ancestors: &mut Vec<PathBuf>,
) -> io::Result<()> {
    let canonical = fs.canonicalize(dir)?;
    if ancestors.contains(&canonical) {
        return Err(filesystem_loop(dir, &canonical));
    }
    ancestors.push(canonical);

    for entry in fs.read_dir(dir)? {
        if entry.kind != EntryKind::Directory {
            continue;
        }
        if entry.name.to_str().is_some_and(|name| names.iter().any(|n| n == name)) {
            found.push(entry.path.clone());
        }
        collect_dirs_named(fs, &entry.path, names, found, ancestors)?;
    }

    ancestors.pop();
    Ok(())
}

/// `FileSystem` backed by `std::fs`
///
/// Entries are listed sorted by file name so results do not depend on the
/// platform's listing order. Symlinks are classified by their target.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    fn kind_of(entry: &fs::DirEntry) -> io::Result<EntryKind> {
        let file_type = entry.file_type()?;
        if file_type.is_file() {
            return Ok(EntryKind::File);
        }
        if file_type.is_dir() {
            return Ok(EntryKind::Directory);
        }
        if file_type.is_symlink() {
            let path = entry.path();
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => return Ok(EntryKind::File),
                Ok(meta) if meta.is_dir() => return Ok(EntryKind::Directory),
                Ok(_) => {
                    debug!(?path, "OsFileSystem::kind_of: symlink to special file");
                }
                Err(e) => {
                    warn!(?path, error = %e, "Skipping dangling symlink");
                }
            }
        }
        Ok(EntryKind::Other)
    }
}

impl FileSystem for OsFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        debug!(?path, "OsFileSystem::read_dir: called");
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let kind = Self::kind_of(&entry)?;
            entries.push(DirEntry {
                path: entry.path(),
                name: entry.file_name(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn find_dirs_named(&self, root: &Path, names: &[String]) -> io::Result<Vec<PathBuf>> {
        debug!(?root, ?names, "OsFileSystem::find_dirs_named: called");
        if !root.is_dir() {
            debug!(?root, "OsFileSystem::find_dirs_named: root is not a directory");
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        // follow_links makes walkdir report ancestor loops as errors
        let walker = WalkDir::new(root).min_depth(1).follow_links(true).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| names.iter().any(|n| n == name))
            {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }
}
