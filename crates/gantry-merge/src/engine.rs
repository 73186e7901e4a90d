//! Converts dependency declarations into descriptor graph edges.
//!
//! One module may declare the same target version several times under one
//! configuration (directly, through plugins, or through inherited build
//! logic). Keeping each as its own edge would duplicate resolution work, so
//! a declaration whose (target version, configuration set) already exists is
//! merged into the existing descriptor instead of appended.
//!
//! Merging folds configuration mappings and artifacts. Exclude rules and the
//! `transitive`/`force` flags are NOT merged: the first-seen descriptor's
//! values win. That asymmetry is a known limitation of the merge, kept so
//! resolution behaves identically whether or not a declaration happened to
//! be a duplicate of a pickier one.

use gantry_model::{
    DeclaredArtifact, DeclaredDependency, DependencyArtifact, DependencyDescriptor,
    ModuleDescriptor,
};
use tracing::debug;
use url::Url;

use crate::error::{MergeError, MergeResult};

/// Record one dependency declaration on `module` under `master_configuration`.
///
/// Appends a new descriptor, unless one with the same requested version and
/// the same configuration set already exists; then the declaration merges
/// into it and the edge count stays put. Fails only on malformed artifact
/// URLs, before the module is touched.
pub fn add_dependency(
    master_configuration: &str,
    module: &mut ModuleDescriptor,
    declared: &DeclaredDependency,
) -> MergeResult<()> {
    let candidate = candidate_descriptor(master_configuration, declared)?;

    // Matching is exact on the value set, independent of declaration order.
    // At most one match can exist; this same procedure keeps it that way.
    let matched = module.dependencies().iter().position(|existing| {
        existing.requested == candidate.requested
            && existing.module_configurations() == candidate.module_configurations()
    });

    match matched {
        Some(index) => merge_into(
            &mut module.dependencies_mut()[index],
            candidate,
            master_configuration,
            declared,
        ),
        None => module.add_dependency(candidate),
    }
    Ok(())
}

/// Build the descriptor a declaration stands for, before merging.
///
/// Public because the non-merging construction path (module descriptors
/// built from already-deduplicated metadata) is the same conversion.
pub fn candidate_descriptor(
    master_configuration: &str,
    declared: &DeclaredDependency,
) -> MergeResult<DependencyDescriptor> {
    let mut descriptor = DependencyDescriptor::new(declared.target.clone());
    descriptor.transitive = declared.transitive;
    descriptor.force = declared.force;

    descriptor
        .add_configuration_mapping(master_configuration, declared.configuration_or_default());
    for artifact in &declared.artifacts {
        descriptor.add_artifact(master_configuration, convert_artifact(artifact)?);
    }
    for rule in &declared.excludes {
        descriptor.add_exclude(master_configuration, rule.clone());
    }

    Ok(descriptor)
}

// TODO: merge exclude rules and the transitive/force flags from later
// declarations instead of keeping the first descriptor's values.
fn merge_into(
    existing: &mut DependencyDescriptor,
    candidate: DependencyDescriptor,
    master_configuration: &str,
    declared: &DeclaredDependency,
) {
    if let Some(configuration) = &declared.configuration {
        existing.add_configuration_mapping(master_configuration, configuration.clone());
    }

    // When exactly one side declares artifacts, the other side meant "take
    // the default artifact"; make that explicit or the combined descriptor
    // would silently drop it.
    if existing.has_artifacts() != candidate.has_artifacts() {
        existing.add_artifact(
            master_configuration,
            DependencyArtifact::default_for(existing.requested.name()),
        );
    }

    for artifact in candidate.artifacts(master_configuration) {
        existing.add_artifact(master_configuration, artifact.clone());
    }

    debug!(
        target = %existing.requested,
        configuration = master_configuration,
        "merged duplicate dependency declaration"
    );
}

fn convert_artifact(declared: &DeclaredArtifact) -> MergeResult<DependencyArtifact> {
    let mut artifact =
        DependencyArtifact::new(declared.name.as_str(), declared.artifact_type.as_str());
    if let Some(extension) = &declared.extension {
        artifact = artifact.with_extension(extension.clone());
    }
    if let Some(classifier) = &declared.classifier {
        artifact = artifact.with_classifier(classifier.clone());
    }
    if let Some(raw) = &declared.url {
        let url = Url::parse(raw).map_err(|source| MergeError::InvalidArtifactUrl {
            artifact: declared.name.clone(),
            url: raw.clone(),
            source,
        })?;
        artifact = artifact.with_url(url);
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_model::{ExcludeRule, ModuleVersionId, DEFAULT_DEPENDENCY_CONFIGURATION};

    fn app() -> ModuleDescriptor {
        ModuleDescriptor::new(ModuleVersionId::of("org.app", "app", "0.1"))
    }

    fn core() -> ModuleVersionId {
        ModuleVersionId::of("org.gantry", "core", "1.0")
    }

    // -----------------------------------------------------------------------
    // Appending
    // -----------------------------------------------------------------------

    #[test]
    fn unmatched_declaration_appends_one_descriptor() {
        let mut module = app();
        let declared = DeclaredDependency::new(core());

        add_dependency("compile", &mut module, &declared).unwrap();

        assert_eq!(module.dependency_count(), 1);
        let descriptor = &module.dependencies()[0];
        assert_eq!(descriptor.requested, core());
        assert_eq!(
            descriptor.dependency_configurations("compile"),
            [DEFAULT_DEPENDENCY_CONFIGURATION]
        );
    }

    #[test]
    fn different_versions_of_one_module_stay_separate() {
        let mut module = app();
        add_dependency("compile", &mut module, &DeclaredDependency::new(core())).unwrap();
        add_dependency(
            "compile",
            &mut module,
            &DeclaredDependency::new(ModuleVersionId::of("org.gantry", "core", "2.0")),
        )
        .unwrap();

        assert_eq!(module.dependency_count(), 2);
    }

    #[test]
    fn same_target_under_another_master_configuration_stays_separate() {
        let mut module = app();
        add_dependency("compile", &mut module, &DeclaredDependency::new(core())).unwrap();
        add_dependency("test", &mut module, &DeclaredDependency::new(core())).unwrap();

        assert_eq!(module.dependency_count(), 2);
    }

    #[test]
    fn multi_configuration_descriptors_do_not_match_single_configuration_candidates() {
        let mut module = app();
        // A descriptor spanning two master configurations, as produced from
        // already-merged module metadata.
        let mut spanning = DependencyDescriptor::new(core());
        spanning.add_configuration_mapping("compile", "default");
        spanning.add_configuration_mapping("test", "default");
        module.add_dependency(spanning);

        add_dependency("compile", &mut module, &DeclaredDependency::new(core())).unwrap();

        // {compile} != {compile, test}, so the declaration appended.
        assert_eq!(module.dependency_count(), 2);
    }

    // -----------------------------------------------------------------------
    // Merging
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_declarations_fold_into_one_descriptor() {
        let mut module = app();
        let first = DeclaredDependency::new(core()).with_configuration("compile");
        let second = DeclaredDependency::new(core())
            .with_configuration("compile")
            .with_artifact(DeclaredArtifact::new("foo", "pkg"));

        add_dependency("default", &mut module, &first).unwrap();
        add_dependency("default", &mut module, &second).unwrap();

        assert_eq!(module.dependency_count(), 1);
        let merged = &module.dependencies()[0];
        // Both mappings folded into a single entry.
        assert_eq!(merged.dependency_configurations("default"), ["compile"]);
        // The artifact-less first declaration meant "default artifact".
        assert_eq!(
            merged.artifacts("default"),
            [
                DependencyArtifact::default_for("core"),
                DependencyArtifact::new("foo", "pkg"),
            ]
        );
    }

    #[test]
    fn default_artifact_is_synthesized_in_the_other_direction_too() {
        let mut module = app();
        let first = DeclaredDependency::new(core())
            .with_artifact(DeclaredArtifact::new("bar", "pkg"));
        let second = DeclaredDependency::new(core());

        add_dependency("default", &mut module, &first).unwrap();
        add_dependency("default", &mut module, &second).unwrap();

        assert_eq!(module.dependency_count(), 1);
        assert_eq!(
            module.dependencies()[0].artifacts("default"),
            [
                DependencyArtifact::new("bar", "pkg"),
                DependencyArtifact::default_for("core"),
            ]
        );
    }

    #[test]
    fn no_default_artifact_when_both_sides_declare_artifacts() {
        let mut module = app();
        let first = DeclaredDependency::new(core())
            .with_artifact(DeclaredArtifact::new("bar", "pkg"));
        let second = DeclaredDependency::new(core())
            .with_artifact(DeclaredArtifact::new("foo", "pkg"));

        add_dependency("default", &mut module, &first).unwrap();
        add_dependency("default", &mut module, &second).unwrap();

        assert_eq!(
            module.dependencies()[0].artifacts("default"),
            [
                DependencyArtifact::new("bar", "pkg"),
                DependencyArtifact::new("foo", "pkg"),
            ]
        );
    }

    #[test]
    fn no_default_artifact_when_neither_side_declares_any() {
        let mut module = app();
        add_dependency("default", &mut module, &DeclaredDependency::new(core())).unwrap();
        add_dependency("default", &mut module, &DeclaredDependency::new(core())).unwrap();

        assert_eq!(module.dependency_count(), 1);
        assert!(!module.dependencies()[0].has_artifacts());
    }

    #[test]
    fn explicit_configurations_accumulate_across_merges() {
        let mut module = app();
        let first = DeclaredDependency::new(core()).with_configuration("compile");
        let second = DeclaredDependency::new(core()).with_configuration("runtime");

        add_dependency("default", &mut module, &first).unwrap();
        add_dependency("default", &mut module, &second).unwrap();

        assert_eq!(module.dependency_count(), 1);
        assert_eq!(
            module.dependencies()[0].dependency_configurations("default"),
            ["compile", "runtime"]
        );
    }

    #[test]
    fn unset_configuration_adds_no_mapping_on_merge() {
        let mut module = app();
        add_dependency("default", &mut module, &DeclaredDependency::new(core())).unwrap();
        add_dependency("default", &mut module, &DeclaredDependency::new(core())).unwrap();

        assert_eq!(
            module.dependencies()[0].dependency_configurations("default"),
            [DEFAULT_DEPENDENCY_CONFIGURATION]
        );
    }

    #[test]
    fn excludes_and_flags_keep_the_first_descriptor_values() {
        let mut module = app();
        let first = DeclaredDependency::new(core())
            .with_transitive(false)
            .with_exclude(ExcludeRule::group("org.legacy"));
        let second = DeclaredDependency::new(core())
            .with_force(true)
            .with_exclude(ExcludeRule::module("old-core"));

        add_dependency("default", &mut module, &first).unwrap();
        add_dependency("default", &mut module, &second).unwrap();

        let merged = &module.dependencies()[0];
        assert!(!merged.transitive);
        assert!(!merged.force);
        assert_eq!(merged.excludes("default"), [ExcludeRule::group("org.legacy")]);
    }

    // -----------------------------------------------------------------------
    // Candidate construction
    // -----------------------------------------------------------------------

    #[test]
    fn candidate_carries_converted_declaration_data() {
        let declared = DeclaredDependency::new(core())
            .with_configuration("api")
            .with_artifact(
                DeclaredArtifact::new("core", "doc")
                    .with_extension("zip")
                    .with_classifier("javadoc"),
            )
            .with_exclude(ExcludeRule::group("org.unwanted"))
            .with_transitive(false)
            .with_force(true);

        let candidate = candidate_descriptor("compile", &declared).unwrap();

        assert_eq!(candidate.requested, core());
        assert!(!candidate.transitive);
        assert!(candidate.force);
        assert_eq!(candidate.dependency_configurations("compile"), ["api"]);
        assert_eq!(
            candidate.excludes("compile"),
            [ExcludeRule::group("org.unwanted")]
        );

        let artifacts = candidate.artifacts("compile");
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].artifact_type, "doc");
        assert_eq!(artifacts[0].extension, "zip");
        assert_eq!(artifacts[0].classifier.as_deref(), Some("javadoc"));
    }

    #[test]
    fn artifact_urls_are_parsed_into_the_candidate() {
        let declared = DeclaredDependency::new(core()).with_artifact(
            DeclaredArtifact::new("core", "pkg").with_url("https://repo.example.net/core.pkg"),
        );

        let candidate = candidate_descriptor("default", &declared).unwrap();
        let url = candidate.artifacts("default")[0].url.as_ref().unwrap();
        assert_eq!(url.as_str(), "https://repo.example.net/core.pkg");
    }

    #[test]
    fn malformed_artifact_url_fails_before_the_module_changes() {
        let mut module = app();
        let declared = DeclaredDependency::new(core())
            .with_artifact(DeclaredArtifact::new("core", "pkg").with_url("::not a url::"));

        let err = add_dependency("default", &mut module, &declared).unwrap_err();

        assert!(matches!(err, MergeError::InvalidArtifactUrl { .. }));
        assert!(err.to_string().contains("core"));
        assert!(err.to_string().contains("::not a url::"));
        assert_eq!(module.dependency_count(), 0);
    }
}
