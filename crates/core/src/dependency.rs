//! Build target labels for dependencies between rules

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// A rule another rule depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Name of the depended-on rule
    pub rule_name: String,
    /// Declaration file that will list the dependency
    pub owning_file_path: PathBuf,
    /// Declaration file defining the depended-on rule
    pub target_file_path: PathBuf,
    /// Directory name of the workspace root
    pub root_dir_name: String,
}

impl Dependency {
    pub fn new(
        rule_name: impl Into<String>,
        owning_file_path: impl Into<PathBuf>,
        target_file_path: impl Into<PathBuf>,
        root_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            owning_file_path: owning_file_path.into(),
            target_file_path: target_file_path.into(),
            root_dir_name: root_dir_name.into(),
        }
    }

    /// Package of the target rule: its directory below the root directory, `/` separated
    pub fn package_path(&self) -> String {
        let dir = self.target_file_path.parent().unwrap_or(Path::new(""));
        let segments: Vec<String> = dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let start = segments
            .iter()
            .position(|s| *s == self.root_dir_name)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        segments[start..].join("/")
    }

    /// Render as a label: `:rule` within the same file, otherwise
    /// `//pkg/path:rule`, with `:rule` left out when it repeats the last
    /// package segment unless `canonical` is set.
    pub fn to_target(&self, canonical: bool) -> String {
        if self.owning_file_path == self.target_file_path {
            return format!(":{}", self.rule_name);
        }
        let package = self.package_path();
        let last_segment = package.rsplit('/').next().unwrap_or("");
        if package.is_empty() || canonical || last_segment != self.rule_name {
            format!("//{package}:{}", self.rule_name)
        } else {
            format!("//{package}")
        }
    }
}

/// Local labels (`:rule`) first, then lexical order
pub fn compare_targets(a: &str, b: &str) -> Ordering {
    let a_local = a.starts_with(':');
    let b_local = b.starts_with(':');
    b_local.cmp(&a_local).then_with(|| a.cmp(b))
}

/// Sort labels with [`compare_targets`] and drop duplicates
pub fn sort_targets(mut targets: Vec<String>) -> Vec<String> {
    targets.sort_by(|a, b| compare_targets(a, b));
    targets.dedup();
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_target() {
        let dep = Dependency::new("util", "/ws/root/pkg/BUILD", "/ws/root/pkg/BUILD", "root");
        assert_eq!(dep.to_target(false), ":util");
        assert_eq!(dep.to_target(true), ":util");
    }

    #[test]
    fn test_package_target_elides_matching_name() {
        let dep = Dependency::new("sub", "/ws/root/app/BUILD", "/ws/root/pkg/sub/BUILD", "root");
        assert_eq!(dep.package_path(), "pkg/sub");
        assert_eq!(dep.to_target(false), "//pkg/sub");
        assert_eq!(dep.to_target(true), "//pkg/sub:sub");
    }

    #[test]
    fn test_package_target_with_other_name() {
        let dep = Dependency::new("helpers", "/ws/root/BUILD", "/ws/root/pkg/sub/BUILD.plz", "root");
        assert_eq!(dep.to_target(false), "//pkg/sub:helpers");
    }

    #[test]
    fn test_root_package_keeps_rule() {
        let dep = Dependency::new("root", "/ws/root/pkg/BUILD", "/ws/root/BUILD", "root");
        assert_eq!(dep.package_path(), "");
        assert_eq!(dep.to_target(false), "//:root");
    }

    #[test]
    fn test_sort_order() {
        let sorted = sort_targets(vec![
            "//b".to_string(),
            ":z".to_string(),
            "//a:x".to_string(),
            ":a".to_string(),
            "//b".to_string(),
        ]);
        assert_eq!(sorted, vec![":a", ":z", "//a:x", "//b"]);
        assert_eq!(compare_targets(":z", "//a"), Ordering::Less);
        assert_eq!(compare_targets("//a", "//b"), Ordering::Less);
    }
}
