use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identifies a module independent of any particular version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    /// Namespace the module is published under (e.g. "org.gantry").
    pub group: String,
    /// Module name within the group.
    pub name: String,
}

impl ModuleId {
    /// Create a module identity from a group and a name.
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// Identifies one published version of a module.
///
/// This is the identity dependency descriptors are keyed by: two declarations
/// requesting the same `ModuleVersionId` point at the same graph node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleVersionId {
    /// The versionless module identity.
    pub module: ModuleId,
    /// The requested version string.
    pub version: String,
}

impl ModuleVersionId {
    /// Create a versioned identity from its parts.
    pub fn new(module: ModuleId, version: impl Into<String>) -> Self {
        Self {
            module,
            version: version.into(),
        }
    }

    /// Convenience constructor from the three notation components.
    pub fn of(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(ModuleId::new(group, name), version)
    }

    /// Parse a `group:name:version` notation string.
    ///
    /// # Examples
    ///
    /// ```
    /// use gantry_model::ModuleVersionId;
    ///
    /// let id = ModuleVersionId::parse("org.gantry:core:1.4.0").unwrap();
    /// assert_eq!(id.module.name, "core");
    /// assert!(ModuleVersionId::parse("org.gantry:core").is_err());
    /// ```
    pub fn parse(notation: &str) -> Result<Self, ModelError> {
        let parts: Vec<&str> = notation.split(':').collect();
        if parts.len() != 3 {
            return Err(ModelError::InvalidNotation {
                notation: notation.to_string(),
                reason: "expected group:name:version".into(),
            });
        }
        for (part, label) in parts.iter().zip(["group", "name", "version"]) {
            if part.is_empty() {
                return Err(ModelError::InvalidNotation {
                    notation: notation.to_string(),
                    reason: format!("{label} must not be empty"),
                });
            }
        }
        Ok(Self::of(parts[0], parts[1], parts[2]))
    }

    /// The module name, without group or version.
    pub fn name(&self) -> &str {
        &self.module.name
    }
}

impl fmt::Display for ModuleVersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.version)
    }
}
