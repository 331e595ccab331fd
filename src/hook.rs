//! Git post-merge hook installation

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const HOOK_NAME: &str = "post-merge";

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Git hooks directory not found: {0}. Make sure you're in a Git repository")]
    NotARepository(PathBuf),

    #[error("Hook already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to write hook {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove hook {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Manages `.git/hooks/post-merge` for one repository
#[derive(Debug, Clone)]
pub struct HookInstaller {
    project_root: PathBuf,
    binary: String,
}

impl HookInstaller {
    /// `binary` is what the hook executes; an absolute path keeps the hook
    /// working when the binary is not on `PATH`
    pub fn new(project_root: &Path, binary: impl Into<String>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            binary: binary.into(),
        }
    }

    /// Uses the path of the running executable, falling back to `redock`
    pub fn for_current_exe(project_root: &Path) -> Self {
        let binary = std::env::current_exe()
            .ok()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        Self::new(project_root, binary)
    }

    pub fn hook_path(&self) -> PathBuf {
        self.project_root.join(".git").join("hooks").join(HOOK_NAME)
    }

    pub fn is_installed(&self) -> bool {
        self.hook_path().exists()
    }

    pub fn hook_content(&self) -> String {
        format!(
            r#"#!/bin/sh
# redock post-merge hook
# Rebuilds the Docker containers after git pull when the changes call for it

echo ""
echo "Git pull detected changes - checking if a Docker rebuild is needed..."
echo ""

REPO_ROOT="$(git rev-parse --show-toplevel)"

exec "{binary}" --project "$REPO_ROOT" run --post-merge
"#,
            binary = self.binary
        )
    }

    /// Writes the hook and marks it executable.
    ///
    /// An existing hook is only replaced when `overwrite` is set.
    pub fn install(&self, overwrite: bool) -> Result<PathBuf, HookError> {
        let hook_path = self.hook_path();
        let hooks_dir = hook_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.project_root.clone());

        if !hooks_dir.is_dir() {
            return Err(HookError::NotARepository(hooks_dir));
        }
        if hook_path.exists() && !overwrite {
            return Err(HookError::AlreadyExists(hook_path));
        }

        std::fs::write(&hook_path, self.hook_content()).map_err(|source| HookError::Write {
            path: hook_path.clone(),
            source,
        })?;
        info!(path = %hook_path.display(), "Hook written");

        if let Err(e) = make_executable(&hook_path) {
            warn!(path = %hook_path.display(), error = %e, "Could not set executable permission");
        }

        Ok(hook_path)
    }

    /// Removes the hook. Returns `false` when there was nothing to remove.
    pub fn uninstall(&self) -> Result<bool, HookError> {
        let hook_path = self.hook_path();
        if !hook_path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(&hook_path).map_err(|source| HookError::Remove {
            path: hook_path.clone(),
            source,
        })?;
        info!(path = %hook_path.display(), "Hook uninstalled");
        Ok(true)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

// Git for Windows runs hooks through its bundled shell
#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
