//! Partials loader entry points

use handlebars::Handlebars;
use tracing::{debug, info};

use crate::error::{ConfigError, LoaderError};
use crate::fs::{FileSystem, OsFileSystem};
use crate::options::PartialsOptions;
use crate::registry::PartialRegistry;
use crate::resolver::resolve_source_dirs;
use crate::walker::PartialWalker;

/// Discovers partials through a `FileSystem` and registers them with an engine
#[derive(Debug, Clone, Default)]
pub struct PartialsLoader<F: FileSystem = OsFileSystem> {
    fs: F,
}

impl PartialsLoader<OsFileSystem> {
    pub fn new() -> Self {
        Self { fs: OsFileSystem }
    }
}

impl<F: FileSystem> PartialsLoader<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Validate `options` and register every partial found under each root
    ///
    /// Roots are processed in order. Validation failures are returned before
    /// the filesystem is touched; an I/O failure stops the whole load.
    pub fn load(&self, engine: Option<&mut dyn PartialRegistry>, options: &PartialsOptions) -> Result<(), LoaderError> {
        debug!("PartialsLoader::load: called");
        let Some(engine) = engine else {
            return Err(ConfigError::Missing { field: "engine" }.into());
        };
        let config = options.validate()?;
        debug!(
            roots = config.root_directories.len(),
            root_sentinel = config.uses_root_sentinel(),
            "PartialsLoader::load: options validated"
        );

        for root in &config.root_directories {
            let sources = resolve_source_dirs(&self.fs, root, &config.partial_directory_names)
                .map_err(|e| LoaderError::io(root, e))?;
            debug!(?root, ?sources, "PartialsLoader::load: resolved source directories");

            let walker = PartialWalker::new(&self.fs, root, &config.extensions, &config.delimiter);
            let mut registered = 0;
            for source in &sources {
                registered += walker.walk(&mut *engine, source)?;
            }
            info!(
                root = %root.display(),
                sources = sources.len(),
                registered,
                "Loaded partials from root"
            );
        }
        Ok(())
    }
}

/// Register partials found on disk with `engine`
pub fn register_partials(engine: Option<&mut dyn PartialRegistry>, options: &PartialsOptions) -> Result<(), LoaderError> {
    PartialsLoader::new().load(engine, options)
}

/// Register partials found on disk with a Handlebars registry
pub fn register_handlebars(hbs: &mut Handlebars<'_>, options: &PartialsOptions) -> Result<(), LoaderError> {
    register_partials(Some(hbs), options)
}
