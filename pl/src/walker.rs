//! Recursive partial discovery and registration

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::error::LoaderError;
use crate::fs::{EntryKind, FileSystem, filesystem_loop};
use crate::registry::PartialRegistry;

/// Walks partial source directories below one root
///
/// Within each directory, files are registered before any subdirectory is
/// entered. Symlinked directories are followed, but a directory that
/// resolves to one of its own ancestors is reported as an I/O error. Any
/// I/O failure aborts the walk.
pub struct PartialWalker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    root: &'a Path,
    extensions: &'a [String],
    delimiter: &'a str,
}

impl<'a, F: FileSystem + ?Sized> PartialWalker<'a, F> {
    pub fn new(fs: &'a F, root: &'a Path, extensions: &'a [String], delimiter: &'a str) -> Self {
        Self {
            fs,
            root,
            extensions,
            delimiter,
        }
    }

    /// Register every matching file below `dir`, returning how many were registered
    pub fn walk(&self, engine: &mut dyn PartialRegistry, dir: &Path) -> Result<usize, LoaderError> {
        debug!(?dir, "PartialWalker::walk: called");
        self.walk_dir(engine, dir, &mut Vec::new())
    }

    fn walk_dir(
        &self,
        engine: &mut dyn PartialRegistry,
        dir: &Path,
        ancestors: &mut Vec<PathBuf>,
    ) -> Result<usize, LoaderError> {
        let canonical = self.fs.canonicalize(dir).map_err(|e| LoaderError::io(dir, e))?;
        if ancestors.contains(&canonical) {
            return Err(LoaderError::io(dir, filesystem_loop(dir, &canonical)));
        }
        let entries = self.fs.read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;

        let mut registered = 0;
        let mut subdirs = Vec::new();
        for entry in entries {
            match entry.kind {
                EntryKind::File => {
                    if self.load_file(engine, &entry.path)? {
                        registered += 1;
                    }
                }
                EntryKind::Directory => subdirs.push(entry.path),
                EntryKind::Other => {
                    debug!(path = ?entry.path, "PartialWalker::walk: skipping entry");
                }
            }
        }

        ancestors.push(canonical);
        for subdir in subdirs {
            registered += self.walk_dir(engine, &subdir, ancestors)?;
        }
        ancestors.pop();
        Ok(registered)
    }

    fn load_file(&self, engine: &mut dyn PartialRegistry, path: &Path) -> Result<bool, LoaderError> {
        let Some(extension) = extension_of(path) else {
            return Ok(false);
        };
        if !self.extensions.iter().any(|e| e == extension) {
            debug!(?path, %extension, "PartialWalker::load_file: extension not allowed");
            return Ok(false);
        }

        let content = self.fs.read_to_string(path).map_err(|e| LoaderError::io(path, e))?;
        let name = namespace_key(self.root, path, self.delimiter).ok_or_else(|| LoaderError::OutsideRoot {
            path: path.to_path_buf(),
            root: self.root.to_path_buf(),
        })?;

        info!(partial = %name, path = %path.display(), "Registering partial");
        engine
            .register(&name, &content)
            .map_err(|source| LoaderError::Register { name, source })?;
        Ok(true)
    }
}

/// Text after the last `.` of the file name
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Partial name for `path`: its components below `root` joined by `delimiter`
///
/// Returns `None` when `path` is not strictly below `root`.
pub fn namespace_key(root: &Path, path: &Path, delimiter: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(parts.join(delimiter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use crate::registry::Recorder;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_namespace_key() {
        let root = Path::new("templates");
        let path = Path::new("templates/partials/nav/menu.hbs");

        assert_eq!(namespace_key(root, path, "/").as_deref(), Some("partials/nav/menu.hbs"));
        assert_eq!(namespace_key(root, path, ".").as_deref(), Some("partials.nav.menu.hbs"));
        assert_eq!(namespace_key(root, path, "::").as_deref(), Some("partials::nav::menu.hbs"));
    }

    #[test]
    fn test_namespace_key_outside_root() {
        assert_eq!(namespace_key(Path::new("templates"), Path::new("other/a.hbs"), "/"), None);
        assert_eq!(namespace_key(Path::new("templates"), Path::new("templates"), "/"), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/header.hbs")), Some("hbs"));
        assert_eq!(extension_of(Path::new("a/header.min.HBS")), Some("HBS"));
        assert_eq!(extension_of(Path::new("a/README")), None);
        assert_eq!(extension_of(Path::new("a/.hbs")), None);
    }

    #[test]
    fn test_walk_registers_relative_to_root() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("partials/nav")).unwrap();
        fs::write(root.join("partials/header.hbs"), "<h1>Hi</h1>").unwrap();
        fs::write(root.join("partials/nav/menu.hbs"), "<ul></ul>").unwrap();
        fs::write(root.join("partials/notes.txt"), "skip").unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, root, &extensions, "/");
        let mut engine: BTreeMap<String, String> = BTreeMap::new();
        let count = walker.walk(&mut engine, &root.join("partials")).unwrap();

        assert_eq!(count, 2);
        assert_eq!(engine.len(), 2);
        assert_eq!(engine["partials/header.hbs"], "<h1>Hi</h1>");
        assert_eq!(engine["partials/nav/menu.hbs"], "<ul></ul>");
    }

    #[test]
    fn test_files_before_subdirectories() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("a/inner.hbs"), "").unwrap();
        fs::write(root.join("z.hbs"), "").unwrap();
        fs::write(root.join("b.hbs"), "").unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, root, &extensions, "/");
        let mut calls: Vec<(String, String)> = Vec::new();
        walker.walk(&mut calls, root).unwrap();

        let names: Vec<_> = calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b.hbs", "z.hbs", "a/inner.hbs"]);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("upper.HBS"), "").unwrap();
        fs::write(temp.path().join("lower.hbs"), "").unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, temp.path(), &extensions, "/");
        let mut engine: BTreeMap<String, String> = BTreeMap::new();
        walker.walk(&mut engine, temp.path()).unwrap();

        assert_eq!(engine.keys().collect::<Vec<_>>(), vec!["lower.hbs"]);
    }

    #[test]
    fn test_missing_source_dir_is_io_error() {
        let temp = tempdir().unwrap();
        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, temp.path(), &extensions, "/");
        let mut engine: BTreeMap<String, String> = BTreeMap::new();

        let missing = temp.path().join("gone");
        let err = walker.walk(&mut engine, &missing).unwrap_err();
        match err {
            LoaderError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_utf8_partial_is_io_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("bad.hbs"), b"\xff\xfe\x00").unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, temp.path(), &extensions, "/");
        let mut engine: BTreeMap<String, String> = BTreeMap::new();

        let err = walker.walk(&mut engine, temp.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_engine_rejection_aborts() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.hbs"), "{{#if x}}").unwrap();
        fs::write(temp.path().join("b.hbs"), "ok").unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, temp.path(), &extensions, "/");
        let mut hbs = handlebars::Handlebars::new();
        let mut recorder = Recorder::new(&mut hbs);

        let err = walker.walk(&mut recorder, temp.path()).unwrap_err();
        match err {
            LoaderError::Register { name, .. } => assert_eq!(name, "a.hbs"),
            other => panic!("unexpected error: {other:?}"),
        }
        // b.hbs sorts after the failing partial and is never reached
        assert!(recorder.registered().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_walked() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("templates");
        fs::create_dir_all(temp.path().join("shared")).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(temp.path().join("shared/btn.hbs"), "<button/>").unwrap();
        std::os::unix::fs::symlink(temp.path().join("shared"), root.join("partials/common")).unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, &root, &extensions, "/");
        let mut engine: BTreeMap<String, String> = BTreeMap::new();
        walker.walk(&mut engine, &root.join("partials")).unwrap();

        assert_eq!(engine.keys().collect::<Vec<_>>(), vec!["partials/common/btn.hbs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_io_error() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("partials/nav")).unwrap();
        fs::write(root.join("partials/header.hbs"), "x").unwrap();
        std::os::unix::fs::symlink(root.join("partials"), root.join("partials/nav/up")).unwrap();

        let extensions = exts(&["hbs"]);
        let walker = PartialWalker::new(&OsFileSystem, root, &extensions, "/");
        let mut engine: BTreeMap<String, String> = BTreeMap::new();

        let err = walker.walk(&mut engine, &root.join("partials")).unwrap_err();
        match err {
            LoaderError::Io { path, source } => {
                assert_eq!(path, root.join("partials/nav/up"));
                assert!(source.to_string().contains("filesystem loop"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_namespace_key_joins_components(
            parts in proptest::collection::vec("[a-z][a-z0-9_-]{0,7}(\\.[a-z]{1,4})?", 1..6),
            delimiter in prop_oneof![Just("/"), Just("."), Just("::"), Just("-")],
        ) {
            let root = PathBuf::from("templates");
            let mut path = root.clone();
            for part in &parts {
                path.push(part);
            }

            let key = namespace_key(&root, &path, delimiter).unwrap();
            prop_assert_eq!(key, parts.join(delimiter));
        }
    }
}
