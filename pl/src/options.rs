//! Loader options and their validation
//!
//! `PartialsOptions` is the raw, loosely typed form accepted from callers and
//! config files: each list field may be a single string or a list of strings.
//! `validate` turns it into a `LoaderConfig` whose lists are non-empty and
//! whose delimiter is always set.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ConfigError;
use crate::{CURRENT_DIR_SENTINEL, DEFAULT_DELIMITER};

/// Raw options for a partials load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialsOptions {
    /// Template root directories to search (string or list of strings)
    #[serde(rename = "root-directories", skip_serializing_if = "Option::is_none")]
    pub root_directories: Option<Value>,

    /// Names of directories holding partials; `.` means the root itself
    #[serde(rename = "partial-directory-names", skip_serializing_if = "Option::is_none")]
    pub partial_directory_names: Option<Value>,

    /// File extensions to load, without the leading dot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,

    /// Separator placed between path components in partial names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<Value>,
}

/// Normalized options, ready for a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub root_directories: Vec<PathBuf>,
    pub partial_directory_names: Vec<String>,
    pub extensions: Vec<String>,
    pub delimiter: String,
}

impl LoaderConfig {
    /// Whether the root directories themselves are the partial sources
    pub fn uses_root_sentinel(&self) -> bool {
        contains_root_sentinel(&self.partial_directory_names)
    }
}

/// Whether `names` contains the `.` sentinel
pub(crate) fn contains_root_sentinel(names: &[String]) -> bool {
    names.iter().any(|n| n == CURRENT_DIR_SENTINEL)
}

impl PartialsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_directories(mut self, value: impl Into<Value>) -> Self {
        self.root_directories = Some(value.into());
        self
    }

    pub fn partial_directory_names(mut self, value: impl Into<Value>) -> Self {
        self.partial_directory_names = Some(value.into());
        self
    }

    pub fn extensions(mut self, value: impl Into<Value>) -> Self {
        self.extensions = Some(value.into());
        self
    }

    pub fn delimiter(mut self, value: impl Into<Value>) -> Self {
        self.delimiter = Some(value.into());
        self
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: PartialsOptions) -> Self {
        Self {
            root_directories: self.root_directories.or(fallback.root_directories),
            partial_directory_names: self.partial_directory_names.or(fallback.partial_directory_names),
            extensions: self.extensions.or(fallback.extensions),
            delimiter: self.delimiter.or(fallback.delimiter),
        }
    }

    /// Validate and normalize the options
    pub fn validate(&self) -> Result<LoaderConfig, ConfigError> {
        debug!(?self, "PartialsOptions::validate: called");
        let root_directories = string_list("root_directories", self.root_directories.as_ref())?
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let partial_directory_names = string_list("partial_directory_names", self.partial_directory_names.as_ref())?;
        let extensions = string_list("extensions", self.extensions.as_ref())?
            .into_iter()
            .map(|ext| match ext.strip_prefix('.') {
                Some(stripped) => stripped.to_string(),
                None => ext,
            })
            .collect();
        let delimiter = delimiter(self.delimiter.as_ref())?;

        let config = LoaderConfig {
            root_directories,
            partial_directory_names,
            extensions,
            delimiter,
        };
        debug!(?config, "PartialsOptions::validate: complete");
        Ok(config)
    }
}

/// Coerce a string or list of strings into a non-empty list
fn string_list(field: &'static str, value: Option<&Value>) -> Result<Vec<String>, ConfigError> {
    match value {
        None | Some(Value::Null) => Err(ConfigError::Missing { field }),
        Some(Value::String(s)) if s.is_empty() => Err(ConfigError::Missing { field }),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Sequence(items)) => {
            if items.is_empty() {
                return Err(ConfigError::Empty { field });
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(ConfigError::NotAString {
                        field,
                        index,
                        found: describe(other),
                    }),
                })
                .collect()
        }
        Some(other) => Err(ConfigError::WrongType {
            field,
            expected: "a string or a list of strings",
            found: describe(other),
        }),
    }
}

fn delimiter(value: Option<&Value>) -> Result<String, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_DELIMITER.to_string()),
        Some(Value::String(s)) if s.is_empty() => Ok(DEFAULT_DELIMITER.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ConfigError::WrongType {
            field: "delimiter",
            expected: "a string",
            found: describe(other),
        }),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
