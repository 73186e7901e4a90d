use serde::{Deserialize, Serialize};

use crate::artifact::DeclaredArtifact;
use crate::exclude::ExcludeRule;
use crate::ids::ModuleVersionId;

/// Dependency-side configuration targeted when a declaration names none.
pub const DEFAULT_DEPENDENCY_CONFIGURATION: &str = "default";

/// One dependency declaration from a build script, before conversion into
/// the module's descriptor graph.
///
/// This is plain input data. The engine decides whether a declaration becomes
/// a new descriptor or is merged into an existing one; this type just records
/// what the user wrote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    /// The module version this declaration requests.
    pub target: ModuleVersionId,
    /// Dependency-side configuration, when explicitly declared.
    pub configuration: Option<String>,
    /// Explicitly declared artifacts; empty means "take the default artifact".
    pub artifacts: Vec<DeclaredArtifact>,
    /// Exclude rules scoped to this declaration.
    pub excludes: Vec<ExcludeRule>,
    /// Whether transitive dependencies of the target are resolved.
    pub transitive: bool,
    /// Whether the declared version overrides conflict resolution.
    pub force: bool,
}

impl DeclaredDependency {
    /// Declare a dependency on the given module version, with defaults:
    /// no explicit configuration, artifacts, or excludes; transitive; not forced.
    pub fn new(target: ModuleVersionId) -> Self {
        Self {
            target,
            configuration: None,
            artifacts: Vec::new(),
            excludes: Vec::new(),
            transitive: true,
            force: false,
        }
    }

    /// Target a specific dependency-side configuration.
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// Declare an explicit artifact.
    pub fn with_artifact(mut self, artifact: DeclaredArtifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    /// Attach an exclude rule.
    pub fn with_exclude(mut self, rule: ExcludeRule) -> Self {
        self.excludes.push(rule);
        self
    }

    /// Control transitive resolution of the target.
    pub fn with_transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }

    /// Force the declared version in conflict resolution.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The dependency-side configuration this declaration maps to.
    pub fn configuration_or_default(&self) -> &str {
        self.configuration
            .as_deref()
            .unwrap_or(DEFAULT_DEPENDENCY_CONFIGURATION)
    }
}
