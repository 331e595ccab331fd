//! Rebuild decision over a change set

use super::pattern::Pattern;
use serde::Serialize;

/// Paths whose change requires rebuilding the images
pub const DEFAULT_REBUILD_PATTERNS: &[&str] = &[
    "backend/**",
    "backend/*",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.*.yml",
    "pom.xml",
    "backend/pom.xml",
    "backend/Dockerfile",
];

/// Paths known to be irrelevant to the images. Informational only: they are
/// reported but never suppress a rebuild.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    "frontend/**",
    "frontend/*",
    "*.md",
    "*.txt",
    ".gitignore",
    "script/**",
    "script/*",
    "document/**",
    "document/*",
];

/// How a single changed file was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Matches a rebuild pattern (regardless of any skip pattern)
    Rebuild,
    /// Matches only a skip pattern
    Skip,
    /// Matches neither list
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    pub path: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuild_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_pattern: Option<String>,
}

/// Two ordered pattern lists compiled once and reused across calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeClassifier {
    rebuild: Vec<Pattern>,
    skip: Vec<Pattern>,
}

impl Default for ChangeClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_REBUILD_PATTERNS.iter().copied(),
            DEFAULT_SKIP_PATTERNS.iter().copied(),
        )
    }
}

impl ChangeClassifier {
    pub fn new<R, S>(rebuild: R, skip: S) -> Self
    where
        R: IntoIterator,
        R::Item: Into<Pattern>,
        S: IntoIterator,
        S::Item: Into<Pattern>,
    {
        Self {
            rebuild: rebuild.into_iter().map(Into::into).collect(),
            skip: skip.into_iter().map(Into::into).collect(),
        }
    }

    pub fn rebuild_patterns(&self) -> &[Pattern] {
        &self.rebuild
    }

    pub fn skip_patterns(&self) -> &[Pattern] {
        &self.skip
    }

    /// True as soon as any changed file matches any rebuild pattern.
    ///
    /// Files are visited in order and, for each file, patterns in list order;
    /// the first hit ends the search. An empty change set never rebuilds.
    pub fn should_rebuild<S: AsRef<str>>(&self, changed_files: &[S]) -> bool {
        if changed_files.is_empty() {
            return false;
        }

        changed_files
            .iter()
            .any(|file| self.rebuild_match(file.as_ref()).is_some())
    }

    /// First rebuild pattern matching `path`
    pub fn rebuild_match(&self, path: &str) -> Option<&Pattern> {
        self.rebuild.iter().find(|pattern| pattern.matches(path))
    }

    /// First skip pattern matching `path`
    pub fn skip_match(&self, path: &str) -> Option<&Pattern> {
        self.skip.iter().find(|pattern| pattern.matches(path))
    }

    pub fn classify(&self, path: &str) -> FileClassification {
        let rebuild_pattern = self.rebuild_match(path).map(|p| p.as_str().to_string());
        let skip_pattern = self.skip_match(path).map(|p| p.as_str().to_string());

        let category = match (&rebuild_pattern, &skip_pattern) {
            (Some(_), _) => Category::Rebuild,
            (None, Some(_)) => Category::Skip,
            (None, None) => Category::Unmatched,
        };

        FileClassification {
            path: path.to_string(),
            category,
            rebuild_pattern,
            skip_pattern,
        }
    }

    /// Per-file breakdown, in change-set order
    pub fn explain<S: AsRef<str>>(&self, changed_files: &[S]) -> Vec<FileClassification> {
        changed_files
            .iter()
            .map(|file| self.classify(file.as_ref()))
            .collect()
    }
}

/// Decides whether `changed_files` warrant a rebuild.
///
/// `skip_patterns` is accepted so callers can pass both configured lists, but
/// it does not take part in the decision.
pub fn should_rebuild<F, P, Q>(
    changed_files: &[F],
    rebuild_patterns: &[P],
    skip_patterns: &[Q],
) -> bool
where
    F: AsRef<str>,
    P: AsRef<str>,
    Q: AsRef<str>,
{
    let classifier = ChangeClassifier::new(
        rebuild_patterns.iter().map(|p| p.as_ref()),
        skip_patterns.iter().map(|p| p.as_ref()),
    );
    classifier.should_rebuild(changed_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use yare::parameterized;

    fn default_decision(files: &[&str]) -> bool {
        should_rebuild(files, DEFAULT_REBUILD_PATTERNS, DEFAULT_SKIP_PATTERNS)
    }

    #[parameterized(
        backend_java = { &["backend/src/main/java/App.java"], true },
        dockerfile = { &["Dockerfile"], true },
        docker_compose = { &["docker-compose.yml"], true },
        docker_compose_variant = { &["docker-compose.dev.yml"], true },
        root_pom = { &["pom.xml"], true },
        frontend_only = { &["frontend/src/App.tsx"], false },
        frontend_js = { &["frontend/x.js"], false },
        markdown_only = { &["README.md", "CHANGELOG.md"], false },
        mixed_with_backend = { &["README.md", "backend/App.java"], true },
        mixed_three = { &["README.md", "backend/src/App.java", "frontend/index.js"], true },
        scripts_and_docs = { &["script/deploy.sh", "document/api.md", ".gitignore"], false },
        unmatched_root_file = { &["LICENSE"], false },
    )]
    fn test_default_decision(files: &[&str], expected: bool) {
        assert_eq!(default_decision(files), expected);
    }

    #[test]
    fn test_empty_change_set_never_rebuilds() {
        let empty: [&str; 0] = [];
        assert!(!default_decision(&empty));
        assert!(!should_rebuild(&empty, &["**"], &[] as &[&str]));
    }

    #[test]
    fn test_skip_patterns_do_not_suppress_rebuild() {
        // A file matching both lists still rebuilds
        let files = ["backend/README.md"];
        assert!(should_rebuild(&files, &["backend/**"], &["*.md", "backend/**"]));
    }

    #[test]
    fn test_skip_patterns_do_not_change_decision() {
        let files = ["frontend/app.js", "notes.txt"];
        let no_skip: [&str; 0] = [];
        assert_eq!(
            should_rebuild(&files, DEFAULT_REBUILD_PATTERNS, DEFAULT_SKIP_PATTERNS),
            should_rebuild(&files, DEFAULT_REBUILD_PATTERNS, &no_skip),
        );
    }

    #[test]
    fn test_empty_rebuild_list_never_rebuilds() {
        let classifier =
            ChangeClassifier::new(Vec::<String>::new(), DEFAULT_SKIP_PATTERNS.iter().copied());
        assert!(!classifier.should_rebuild(&["backend/App.java", "Dockerfile"]));
    }

    #[test]
    fn test_rebuild_match_reports_first_pattern_in_order() {
        let classifier = ChangeClassifier::default();
        let hit = classifier.rebuild_match("backend/pom.xml").map(Pattern::as_str);
        assert_eq!(hit, Some("backend/**"));
    }

    #[test]
    fn test_classify_categories() {
        let classifier = ChangeClassifier::default();

        let report = classifier.explain(&["backend/App.java", "README.md", "LICENSE"]);
        let categories: Vec<Category> = report.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![Category::Rebuild, Category::Skip, Category::Unmatched]
        );
        assert_eq!(report[1].skip_pattern.as_deref(), Some("*.md"));
        assert!(report[2].rebuild_pattern.is_none());
    }

    #[test]
    fn test_classification_serializes_lowercase_category() {
        let classification = ChangeClassifier::default().classify("Dockerfile");
        let json = serde_json::to_value(&classification).unwrap();
        assert_eq!(json["category"], "rebuild");
        assert_eq!(json["rebuild_pattern"], "Dockerfile");
        assert!(json.get("skip_pattern").is_none());
    }

    fn backend_file() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("backend/src/main/java/App.java".to_string()),
            Just("backend/pom.xml".to_string()),
            Just("backend/Dockerfile".to_string()),
            "[a-z]{1,10}".prop_map(|name| format!("backend/{}.java", name)),
            "[a-z]{1,10}".prop_map(|name| format!("backend/src/main/java/{}.java", name)),
        ]
    }

    fn skip_only_file() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("README.md".to_string()),
            Just("document/api.md".to_string()),
            Just("frontend/package.json".to_string()),
            Just("script/deploy.sh".to_string()),
            "[a-z]{1,10}".prop_map(|name| format!("frontend/{}.js", name)),
            "[A-Z]{1,10}".prop_map(|name| format!("{}.md", name)),
            "[a-z]{1,10}".prop_map(|name| format!("document/{}.md", name)),
        ]
    }

    proptest! {
        #[test]
        fn prop_any_backend_file_triggers_rebuild(
            skipped in prop::collection::vec(skip_only_file(), 0..4),
            backend in backend_file(),
            position in any::<prop::sample::Index>(),
        ) {
            let mut files = skipped;
            let at = position.index(files.len() + 1);
            files.insert(at, backend);
            prop_assert!(ChangeClassifier::default().should_rebuild(&files));
        }

        #[test]
        fn prop_skip_only_change_sets_do_not_rebuild(
            files in prop::collection::vec(skip_only_file(), 1..6),
        ) {
            prop_assert!(!ChangeClassifier::default().should_rebuild(&files));
        }

        #[test]
        fn prop_decision_is_order_independent(
            files in prop::collection::vec(prop_oneof![backend_file(), skip_only_file()], 0..6),
        ) {
            let classifier = ChangeClassifier::default();
            let mut reversed = files.clone();
            reversed.reverse();
            let mut rotated = files.clone();
            if !rotated.is_empty() {
                rotated.rotate_left(1);
            }
            let decision = classifier.should_rebuild(&files);
            prop_assert_eq!(decision, classifier.should_rebuild(&reversed));
            prop_assert_eq!(decision, classifier.should_rebuild(&rotated));
        }
    }
}
