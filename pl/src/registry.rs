//! Template engine sinks for discovered partials

use std::collections::{BTreeMap, HashMap};

use handlebars::Handlebars;
use tracing::debug;

use crate::error::BoxError;

/// Anything partials can be registered with
///
/// Registering a name twice replaces the earlier content.
pub trait PartialRegistry {
    fn register(&mut self, name: &str, content: &str) -> Result<(), BoxError>;
}

impl PartialRegistry for Handlebars<'_> {
    fn register(&mut self, name: &str, content: &str) -> Result<(), BoxError> {
        debug!(%name, "Handlebars::register: called");
        self.register_partial(name, content).map_err(Into::into)
    }
}

impl PartialRegistry for BTreeMap<String, String> {
    fn register(&mut self, name: &str, content: &str) -> Result<(), BoxError> {
        self.insert(name.to_string(), content.to_string());
        Ok(())
    }
}

impl PartialRegistry for HashMap<String, String> {
    fn register(&mut self, name: &str, content: &str) -> Result<(), BoxError> {
        self.insert(name.to_string(), content.to_string());
        Ok(())
    }
}

/// Keeps every call, duplicates included
impl PartialRegistry for Vec<(String, String)> {
    fn register(&mut self, name: &str, content: &str) -> Result<(), BoxError> {
        self.push((name.to_string(), content.to_string()));
        Ok(())
    }
}

/// A partial accepted by the wrapped registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredPartial {
    pub name: String,
    pub bytes: usize,
}

/// Forwards to another registry and records what was accepted
pub struct Recorder<'a> {
    inner: &'a mut dyn PartialRegistry,
    registered: Vec<RegisteredPartial>,
}

impl<'a> Recorder<'a> {
    pub fn new(inner: &'a mut dyn PartialRegistry) -> Self {
        Self {
            inner,
            registered: Vec::new(),
        }
    }

    /// Partials in registration order
    pub fn registered(&self) -> &[RegisteredPartial] {
        &self.registered
    }

    pub fn into_registered(self) -> Vec<RegisteredPartial> {
        self.registered
    }
}

impl PartialRegistry for Recorder<'_> {
    fn register(&mut self, name: &str, content: &str) -> Result<(), BoxError> {
        self.inner.register(name, content)?;
        self.registered.push(RegisteredPartial {
            name: name.to_string(),
            bytes: content.len(),
        });
        Ok(())
    }
}
