use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::artifact::DependencyArtifact;
use crate::configuration::Configuration;
use crate::exclude::ExcludeRule;
use crate::ids::ModuleVersionId;

/// One edge of a module's dependency graph: a requested module version plus
/// everything the declaring configurations attached to it.
///
/// The three per-configuration tables are keyed by *master configuration*
/// (the configuration of the declaring module). BTreeMaps keep iteration
/// deterministic, so identical declarations always produce identical graphs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    /// The module version this dependency resolves toward.
    pub requested: ModuleVersionId,
    /// Whether transitive dependencies of the target are resolved.
    pub transitive: bool,
    /// Whether the requested version overrides conflict resolution.
    pub force: bool,
    /// Master configuration -> dependency-side configurations.
    configurations: BTreeMap<String, Vec<String>>,
    /// Master configuration -> artifacts declared for it.
    artifacts: BTreeMap<String, Vec<DependencyArtifact>>,
    /// Master configuration -> exclude rules scoped to it.
    excludes: BTreeMap<String, Vec<ExcludeRule>>,
}

impl DependencyDescriptor {
    /// Create an empty descriptor for the given target.
    pub fn new(requested: ModuleVersionId) -> Self {
        Self {
            requested,
            transitive: true,
            force: false,
            configurations: BTreeMap::new(),
            artifacts: BTreeMap::new(),
            excludes: BTreeMap::new(),
        }
    }

    /// Record that `master` depends on the target's `dependency_configuration`.
    ///
    /// Duplicate mappings fold into one entry.
    pub fn add_configuration_mapping(
        &mut self,
        master: impl Into<String>,
        dependency_configuration: impl Into<String>,
    ) {
        let confs = self.configurations.entry(master.into()).or_default();
        let dependency_configuration = dependency_configuration.into();
        if !confs.contains(&dependency_configuration) {
            confs.push(dependency_configuration);
        }
    }

    /// The dependency-side configurations mapped from `master`.
    pub fn dependency_configurations(&self, master: &str) -> &[String] {
        self.configurations
            .get(master)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The set of master configurations this descriptor is declared under.
    ///
    /// Descriptor matching compares this as a set: declaration order never
    /// affects whether two descriptors are considered the same edge.
    pub fn module_configurations(&self) -> BTreeSet<&str> {
        self.configurations.keys().map(String::as_str).collect()
    }

    /// Attach an artifact under a master configuration.
    pub fn add_artifact(&mut self, master: impl Into<String>, artifact: DependencyArtifact) {
        self.artifacts.entry(master.into()).or_default().push(artifact);
    }

    /// Artifacts attached under `master`.
    pub fn artifacts(&self, master: &str) -> &[DependencyArtifact] {
        self.artifacts.get(master).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All attached artifacts across configurations, in deterministic order.
    pub fn all_artifacts(&self) -> impl Iterator<Item = &DependencyArtifact> {
        self.artifacts.values().flatten()
    }

    /// Returns `true` if any configuration declares an explicit artifact.
    pub fn has_artifacts(&self) -> bool {
        self.artifacts.values().any(|artifacts| !artifacts.is_empty())
    }

    /// Attach an exclude rule under a master configuration.
    pub fn add_exclude(&mut self, master: impl Into<String>, rule: ExcludeRule) {
        self.excludes.entry(master.into()).or_default().push(rule);
    }

    /// Exclude rules scoped to `master`.
    pub fn excludes(&self, master: &str) -> &[ExcludeRule] {
        self.excludes.get(master).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A module's full descriptor: identity, configurations, and dependency edges.
///
/// The edge collection is ordered (declaration order) and, once built through
/// the merge engine, carries at most one descriptor per (target version,
/// configuration set) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// The module this descriptor describes.
    pub id: ModuleVersionId,
    configurations: Vec<Configuration>,
    dependencies: Vec<DependencyDescriptor>,
}

impl ModuleDescriptor {
    /// Create a descriptor with no configurations or dependencies.
    pub fn new(id: ModuleVersionId) -> Self {
        Self {
            id,
            configurations: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Add a configuration.
    pub fn add_configuration(&mut self, configuration: Configuration) {
        self.configurations.push(configuration);
    }

    /// The module's configurations, in declaration order.
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Look up a configuration by name.
    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    /// Append a dependency edge.
    pub fn add_dependency(&mut self, dependency: DependencyDescriptor) {
        self.dependencies.push(dependency);
    }

    /// The dependency edges, in declaration order.
    pub fn dependencies(&self) -> &[DependencyDescriptor] {
        &self.dependencies
    }

    /// Mutable view of the dependency edges, for in-place merging.
    pub fn dependencies_mut(&mut self) -> &mut [DependencyDescriptor] {
        &mut self.dependencies
    }

    /// Number of dependency edges.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }
}
