//! PartialsLoader - recursive template partial registration
//!
//! Finds partial template files below one or more template roots and
//! registers each with a template engine under a name derived from its path
//! relative to the root.
//!
//! # Layout
//!
//! ```text
//! templates/                 <- root directory
//! ├── pages/index.hbs
//! └── partials/              <- matched by name "partials"
//!     ├── header.hbs         -> "partials/header.hbs"
//!     └── nav/
//!         └── menu.hbs       -> "partials/nav/menu.hbs"
//! ```
//!
//! Passing `.` as a directory name loads the root itself instead of
//! searching for named directories.
//!
//! # Example
//!
//! ```ignore
//! use handlebars::Handlebars;
//! use partialsloader::{PartialsOptions, register_handlebars};
//!
//! let mut hbs = Handlebars::new();
//! let options = PartialsOptions::new()
//!     .root_directories("templates")
//!     .partial_directory_names(vec!["partials"])
//!     .extensions(vec!["hbs"]);
//! register_handlebars(&mut hbs, &options)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
mod loader;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod walker;

pub use error::{BoxError, ConfigError, LoaderError};
pub use fs::{DirEntry, EntryKind, FileSystem, OsFileSystem};
pub use loader::{PartialsLoader, register_handlebars, register_partials};
pub use options::{LoaderConfig, PartialsOptions};
pub use registry::{PartialRegistry, Recorder, RegisteredPartial};

/// Directory name meaning "the root directory itself"
pub const CURRENT_DIR_SENTINEL: &str = ".";

/// Separator used in partial names when none is configured
pub const DEFAULT_DELIMITER: &str = "/";
