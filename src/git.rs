//! Changed-file discovery through git

use crate::process::{CommandRunner, Invocation};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reference ranges tried in order: the pre-merge position of HEAD, then the
/// previous commit.
const DIFF_RANGES: &[(&str, &str)] = &[("HEAD@{1}", "HEAD"), ("HEAD~1", "HEAD")];

pub struct GitClient<'a> {
    runner: &'a dyn CommandRunner,
    repo_root: PathBuf,
}

impl<'a> GitClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, repo_root: &Path) -> Self {
        Self {
            runner,
            repo_root: repo_root.to_path_buf(),
        }
    }

    /// Files touched by the last merge or pull.
    ///
    /// Returns an empty list when neither range yields anything; that is a
    /// valid answer meaning there is nothing to evaluate.
    pub async fn changed_files(&self) -> Vec<String> {
        for (index, (from, to)) in DIFF_RANGES.iter().enumerate() {
            let files = self.diff_names(from, to).await;
            if !files.is_empty() {
                if index == 0 {
                    info!(count = files.len(), files = ?files, "Changed files");
                } else {
                    info!(count = files.len(), files = ?files, "Changed files (fallback)");
                }
                return files;
            }
        }

        warn!("Could not determine changed files");
        Vec::new()
    }

    async fn diff_names(&self, from: &str, to: &str) -> Vec<String> {
        let invocation =
            Invocation::new("git", ["diff", "--name-only", from, to], &self.repo_root).captured();

        match self.runner.run(&invocation).await {
            Ok(output) if output.success => parse_name_only(&output.stdout),
            Ok(output) => {
                debug!(range = %format!("{}..{}", from, to), reason = %output.failure_message(), "git diff failed");
                Vec::new()
            }
            Err(e) => {
                debug!(error = %e, "git diff could not run");
                Vec::new()
            }
        }
    }
}

/// Splits `git diff --name-only` output into trimmed, non-empty paths
pub fn parse_name_only(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
