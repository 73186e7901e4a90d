//! Descriptor construction and merging for the Gantry resolution engine.
//!
//! The build-script layer hands the engine one [`DeclaredDependency`] per
//! declaration. When a module declares the same target version twice under
//! the same configuration, the declarations fold into a single descriptor
//! instead of duplicating a graph edge; everything else appends.
//!
//! [`DeclaredDependency`]: gantry_model::DeclaredDependency

pub mod engine;
pub mod error;

pub use engine::{add_dependency, candidate_descriptor};
pub use error::{MergeError, MergeResult};
