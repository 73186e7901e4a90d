use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::ModuleId;

/// A rule excluding a module subtree from transitive resolution.
///
/// Unset fields act as wildcards: a rule with only a group set excludes every
/// module in that group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeRule {
    /// Group to exclude, or any group when unset.
    pub group: Option<String>,
    /// Module name to exclude, or any name when unset.
    pub module: Option<String>,
}

impl ExcludeRule {
    /// Exclude everything in a group.
    pub fn group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            module: None,
        }
    }

    /// Exclude a module name in any group.
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            group: None,
            module: Some(module.into()),
        }
    }

    /// Exclude one specific module.
    pub fn of(group: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            module: Some(module.into()),
        }
    }

    /// Returns `true` if the given module identity falls under this rule.
    pub fn matches(&self, id: &ModuleId) -> bool {
        if let Some(group) = &self.group {
            if group != &id.group {
                return false;
            }
        }
        if let Some(module) = &self.module {
            if module != &id.name {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for ExcludeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.group.as_deref().unwrap_or("*"),
            self.module.as_deref().unwrap_or("*")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_rule_matches_any_name_in_group() {
        let rule = ExcludeRule::group("org.legacy");
        assert!(rule.matches(&ModuleId::new("org.legacy", "util")));
        assert!(rule.matches(&ModuleId::new("org.legacy", "core")));
        assert!(!rule.matches(&ModuleId::new("org.other", "util")));
    }

    #[test]
    fn module_rule_matches_across_groups() {
        let rule = ExcludeRule::module("util");
        assert!(rule.matches(&ModuleId::new("a", "util")));
        assert!(rule.matches(&ModuleId::new("b", "util")));
        assert!(!rule.matches(&ModuleId::new("a", "core")));
    }

    #[test]
    fn exact_rule_requires_both() {
        let rule = ExcludeRule::of("org.legacy", "util");
        assert!(rule.matches(&ModuleId::new("org.legacy", "util")));
        assert!(!rule.matches(&ModuleId::new("org.legacy", "core")));
        assert!(!rule.matches(&ModuleId::new("org.other", "util")));
    }

    #[test]
    fn display_uses_wildcards() {
        assert_eq!(ExcludeRule::group("org.legacy").to_string(), "org.legacy:*");
        assert_eq!(ExcludeRule::module("util").to_string(), "*:util");
    }
}
