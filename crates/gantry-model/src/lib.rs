//! Descriptor model for the Gantry resolution engine.
//!
//! This crate provides the plain data types the resolution engine works on:
//! module identities, configurations, declared dependencies, and the
//! descriptor graph a module carries once its declarations are converted.
//! Every other Gantry crate depends on `gantry-model`; it contains no engine
//! logic of its own.
//!
//! # Key Types
//!
//! - [`ModuleId`] / [`ModuleVersionId`] — module identity, with and without a version
//! - [`Configuration`] — a named bucket of dependencies within a module
//! - [`DeclaredDependency`] / [`DeclaredArtifact`] — raw build-script input data
//! - [`DependencyDescriptor`] — one converted dependency edge with its
//!   configuration mappings, artifacts, and exclude rules
//! - [`ModuleDescriptor`] — a module's identity plus its accumulated edges

pub mod artifact;
pub mod configuration;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod exclude;
pub mod ids;

pub use artifact::{DeclaredArtifact, DependencyArtifact, DEFAULT_ARTIFACT_TYPE};
pub use configuration::Configuration;
pub use dependency::{DeclaredDependency, DEFAULT_DEPENDENCY_CONFIGURATION};
pub use descriptor::{DependencyDescriptor, ModuleDescriptor};
pub use error::ModelError;
pub use exclude::ExcludeRule;
pub use ids::{ModuleId, ModuleVersionId};
