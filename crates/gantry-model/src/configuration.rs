use std::fmt;

use serde::{Deserialize, Serialize};

/// A named bucket of dependencies and artifacts within a module.
///
/// Configurations form the module-side namespace dependency declarations are
/// attached to (e.g. "compile", "runtime"). A configuration may extend
/// others, inheriting their contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Configuration name, unique within its module.
    pub name: String,
    /// Names of configurations this one extends.
    pub extends: Vec<String>,
}

impl Configuration {
    /// Create a configuration with no parents.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
        }
    }

    /// Add a parent configuration.
    pub fn extend(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
