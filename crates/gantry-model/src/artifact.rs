use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Artifact type (and extension) assumed when a dependency declares none.
pub const DEFAULT_ARTIFACT_TYPE: &str = "pkg";

/// An artifact declaration as written in a build script.
///
/// This is raw input data: the URL, if any, is still an unvalidated string.
/// Conversion into a [`DependencyArtifact`] parses and validates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredArtifact {
    /// Artifact name.
    pub name: String,
    /// Artifact type (e.g. "pkg", "src", "doc").
    pub artifact_type: String,
    /// File extension; the artifact type stands in when unset.
    pub extension: Option<String>,
    /// Qualifier distinguishing artifacts of the same name and type.
    pub classifier: Option<String>,
    /// Direct download location, bypassing repository layout rules.
    pub url: Option<String>,
}

impl DeclaredArtifact {
    /// Declare an artifact by name and type.
    pub fn new(name: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
            extension: None,
            classifier: None,
            url: None,
        }
    }

    /// Set an explicit file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Set a classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Set a direct download URL (validated during conversion).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A validated artifact attached to a dependency descriptor.
///
/// Unlike [`DeclaredArtifact`], the extension is resolved (falling back to
/// the artifact type) and the URL, when present, is parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyArtifact {
    /// Artifact name.
    pub name: String,
    /// Artifact type.
    pub artifact_type: String,
    /// Resolved file extension.
    pub extension: String,
    /// Qualifier distinguishing artifacts of the same name and type.
    pub classifier: Option<String>,
    /// Validated direct download location.
    pub url: Option<Url>,
}

impl DependencyArtifact {
    /// Create an artifact whose extension equals its type.
    pub fn new(name: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        let artifact_type = artifact_type.into();
        Self {
            name: name.into(),
            extension: artifact_type.clone(),
            artifact_type,
            classifier: None,
            url: None,
        }
    }

    /// The default artifact a dependency implies when it declares none:
    /// named after the target module, typed [`DEFAULT_ARTIFACT_TYPE`].
    pub fn default_for(module_name: impl Into<String>) -> Self {
        Self::new(module_name, DEFAULT_ARTIFACT_TYPE)
    }

    /// Set an explicit file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set a classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Set a validated download URL.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }
}

impl fmt::Display for DependencyArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, " ({classifier})")?;
        }
        Ok(())
    }
}
