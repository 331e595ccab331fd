//! Docker prerequisite checks

use crate::compose::ComposeClient;
use crate::process::{CommandRunner, Invocation};
use crate::progress::{ProgressHandler, WorkflowEvent};
use crate::step::{Step, StepResult};
use async_trait::async_trait;
use bollard::Docker;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Reports whether the Docker daemon answers
#[async_trait]
pub trait DaemonProbe: Send + Sync {
    async fn ping(&self) -> Result<(), String>;
}

/// Pings the daemon over the local socket (or `DOCKER_HOST`)
#[derive(Debug, Default, Clone, Copy)]
pub struct BollardProbe;

#[async_trait]
impl DaemonProbe for BollardProbe {
    async fn ping(&self) -> Result<(), String> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| {
            debug!("Failed to connect to Docker: {}", e);
            e.to_string()
        })?;

        match docker.ping().await {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Docker ping failed: {}", e);
                Err(e.to_string())
            }
        }
    }
}

/// Runs the checks in order, stopping at the first failure: the Docker CLI,
/// the daemon, then the compose CLI
pub struct Prerequisites<'a> {
    runner: &'a dyn CommandRunner,
    daemon: &'a dyn DaemonProbe,
    compose: &'a ComposeClient<'a>,
    project_root: &'a Path,
}

impl<'a> Prerequisites<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        daemon: &'a dyn DaemonProbe,
        compose: &'a ComposeClient<'a>,
        project_root: &'a Path,
    ) -> Self {
        Self {
            runner,
            daemon,
            compose,
            project_root,
        }
    }

    pub async fn check(&self, progress: &dyn ProgressHandler) -> StepResult {
        let started = Instant::now();

        let docker = Invocation::new("docker", ["--version"], self.project_root).captured();
        if let Err(message) = self.version_check("Docker", &docker, progress).await {
            return self.fail(message, started, progress);
        }

        let daemon = self.daemon.ping().await;
        progress.on_event(&WorkflowEvent::PrerequisiteChecked {
            name: "Docker daemon".to_string(),
            passed: daemon.is_ok(),
            detail: None,
        });
        if daemon.is_err() {
            return self.fail(
                "Docker daemon is not running. Please start Docker.",
                started,
                progress,
            );
        }

        let compose = self.compose.version_invocation();
        if let Err(message) = self.version_check("Docker Compose", &compose, progress).await {
            return self.fail(message, started, progress);
        }

        StepResult::succeeded(Step::Prerequisites, "Prerequisites available", started)
    }

    /// Runs `<tool> --version`, reporting the first output line on success
    async fn version_check(
        &self,
        name: &str,
        invocation: &Invocation,
        progress: &dyn ProgressHandler,
    ) -> Result<(), String> {
        let result = self.runner.run(invocation).await;
        let detail = match &result {
            Ok(output) if output.success => {
                Some(output.first_line().unwrap_or("unknown").to_string())
            }
            _ => None,
        };
        let passed = detail.is_some();

        progress.on_event(&WorkflowEvent::PrerequisiteChecked {
            name: name.to_string(),
            passed,
            detail,
        });

        if passed {
            Ok(())
        } else {
            Err(format!("{} is not installed", name))
        }
    }

    fn fail(
        &self,
        message: impl Into<String>,
        started: Instant,
        progress: &dyn ProgressHandler,
    ) -> StepResult {
        let result = StepResult::failed(Step::Prerequisites, message, started);
        progress.on_event(&WorkflowEvent::Error {
            message: result.message.clone(),
        });
        result
    }
}
