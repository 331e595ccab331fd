//! The rebuild workflow
//!
//! Composes the override flags, the git collaborator, the change classifier
//! and the compose lifecycle. The order of precedence is fixed:
//!
//! 1. `SKIP_DOCKER_REBUILD=1` skips everything, before any tool is probed
//! 2. an explicit stop request stops the containers
//! 3. `--force` (or `--rebuild`) rebuilds unconditionally
//! 4. a post-merge run asks git for the changed files and rebuilds only when
//!    the classifier says so

use crate::classifier::ChangeClassifier;
use crate::compose::{read_services, ComposeClient, HealthCheck};
use crate::config::{RedockConfig, SKIP_ENV_VAR};
use crate::docker::{DaemonProbe, Prerequisites};
use crate::git::GitClient;
use crate::process::CommandRunner;
use crate::progress::{ProgressHandler, WorkflowEvent};
use crate::step::{Step, StepResult};
use tracing::{debug, info};

/// How many changed files are listed before the rest are summarised
const CHANGED_FILES_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Rebuild, unless this is a post-merge run without relevant changes
    #[default]
    Auto,
    /// Rebuild unconditionally
    Rebuild,
    /// Stop the containers and do nothing else
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: Mode,
    pub force: bool,
    /// Invoked from the git post-merge hook
    pub post_merge: bool,
    /// Follow container logs once everything is up
    pub show_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    Forced,
    Requested,
    ChangesDetected,
    AutoMode,
}

/// What to do, decided before touching any external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Suppressed,
    Stop,
    Rebuild(RebuildReason),
    /// Ask git what changed, then let the classifier decide
    CheckChanges,
}

/// Applies the override flags in priority order
pub fn plan(suppressed: bool, options: &RunOptions) -> Plan {
    if suppressed {
        Plan::Suppressed
    } else if options.mode == Mode::Stop {
        Plan::Stop
    } else if options.force {
        Plan::Rebuild(RebuildReason::Forced)
    } else if options.mode == Mode::Rebuild {
        Plan::Rebuild(RebuildReason::Requested)
    } else if options.post_merge {
        Plan::CheckChanges
    } else {
        Plan::Rebuild(RebuildReason::AutoMode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `SKIP_DOCKER_REBUILD=1` was set
    Suppressed,
    Stopped,
    /// Git reported no changed files
    NoChanges,
    /// Files changed, but none of them match a rebuild pattern
    Unchanged,
    Rebuilt { health: HealthCheck },
    Failed(StepResult),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

pub struct Workflow<'a> {
    config: &'a RedockConfig,
    runner: &'a dyn CommandRunner,
    daemon: &'a dyn DaemonProbe,
    progress: &'a dyn ProgressHandler,
}

impl<'a> Workflow<'a> {
    pub fn new(
        config: &'a RedockConfig,
        runner: &'a dyn CommandRunner,
        daemon: &'a dyn DaemonProbe,
        progress: &'a dyn ProgressHandler,
    ) -> Self {
        Self {
            config,
            runner,
            daemon,
            progress,
        }
    }

    pub async fn run(&self, options: &RunOptions) -> Outcome {
        info!(
            mode = ?options.mode,
            force = options.force,
            post_merge = options.post_merge,
            "Starting automation"
        );

        let plan = plan(self.config.skip_rebuild, options);
        if plan == Plan::Suppressed {
            return report_suppressed(self.progress);
        }

        self.emit(WorkflowEvent::Header {
            title: "redock - Docker automation".to_string(),
        });

        let compose = ComposeClient::new(self.runner, self.config);
        let mut steps = StepCounter::default();

        if plan == Plan::Stop {
            let result = self.stop(&compose, &mut steps).await;
            return if result.success {
                Outcome::Stopped
            } else {
                Outcome::Failed(result)
            };
        }

        self.begin(&mut steps, Step::Prerequisites, "Checking prerequisites...");
        let prerequisites =
            Prerequisites::new(self.runner, self.daemon, &compose, &self.config.project_root);
        let result = prerequisites.check(self.progress).await;
        if !result.success {
            return Outcome::Failed(result);
        }

        match plan {
            Plan::Rebuild(RebuildReason::Forced) | Plan::Rebuild(RebuildReason::Requested) => {
                self.emit(WorkflowEvent::Info {
                    message: "Force rebuild requested".to_string(),
                });
            }
            Plan::CheckChanges => {
                if let Some(outcome) = self.check_changes(&mut steps).await {
                    return outcome;
                }
            }
            _ => {}
        }

        self.rebuild(&compose, &mut steps, options.show_logs).await
    }

    /// Returns an outcome when the change set does not call for a rebuild
    async fn check_changes(&self, steps: &mut StepCounter) -> Option<Outcome> {
        self.emit(WorkflowEvent::StepStarted {
            number: steps.next(),
            step: Step::Prerequisites,
            description: "Checking changed files...".to_string(),
        });

        let files = GitClient::new(self.runner, &self.config.project_root)
            .changed_files()
            .await;

        if files.is_empty() {
            self.emit(WorkflowEvent::Info {
                message: "No changed files detected".to_string(),
            });
            return Some(Outcome::NoChanges);
        }

        self.emit(WorkflowEvent::Info {
            message: format!("Found {} changed file(s)", files.len()),
        });
        self.emit(WorkflowEvent::ChangedFiles {
            shown: files.iter().take(CHANGED_FILES_SHOWN).cloned().collect(),
            total: files.len(),
        });

        let classifier = self.config.classifier();
        if classifier.should_rebuild(&files) {
            log_trigger(&classifier, &files);
            self.emit(WorkflowEvent::Info {
                message: "Rebuild-relevant changes detected - rebuild required".to_string(),
            });
            None
        } else {
            self.emit(WorkflowEvent::Info {
                message: "No rebuild-relevant changes - skipping rebuild".to_string(),
            });
            self.emit(WorkflowEvent::Success {
                message: "No rebuild needed. Containers unchanged.".to_string(),
            });
            Some(Outcome::Unchanged)
        }
    }

    /// stop -> build -> start -> health; stop and health never abort
    async fn rebuild(
        &self,
        compose: &ComposeClient<'_>,
        steps: &mut StepCounter,
        show_logs: bool,
    ) -> Outcome {
        info!("Starting rebuild workflow");

        let result = self.stop(compose, steps).await;
        if !result.success {
            self.emit(WorkflowEvent::Warning {
                message: "Stop failed, attempting to continue...".to_string(),
            });
        }

        self.begin(steps, Step::Build, "Building containers...");
        let result = compose.build().await;
        if !result.success {
            self.emit(WorkflowEvent::Error {
                message: format!("Failed to build images: {}", result.message),
            });
            return Outcome::Failed(result);
        }
        self.emit(WorkflowEvent::Success {
            message: format!(
                "Images built successfully ({:.1}s)",
                result.duration.as_secs_f64()
            ),
        });

        self.begin(steps, Step::Start, "Starting containers...");
        let result = compose.start().await;
        if !result.success {
            self.emit(WorkflowEvent::Error {
                message: format!("Failed to start containers: {}", result.message),
            });
            return Outcome::Failed(result);
        }
        self.emit(WorkflowEvent::Success {
            message: result.message.clone(),
        });

        self.begin(steps, Step::Health, "Waiting for services to be healthy...");
        let health = compose.wait_for_health(self.progress).await;
        if health.timed_out() {
            self.emit(WorkflowEvent::Warning {
                message: "Health check timed out, but services may still be starting".to_string(),
            });
        } else {
            self.emit(WorkflowEvent::Success {
                message: format!(
                    "Services are healthy ({:.1}s)",
                    health.result.duration.as_secs_f64()
                ),
            });
        }

        self.emit(WorkflowEvent::ServicesRunning {
            services: read_services(&self.config.compose_file_path()),
            compose_command: compose.command_display(),
        });

        if show_logs {
            self.emit(WorkflowEvent::Info {
                message: "Showing logs (Ctrl+C to exit)...".to_string(),
            });
            let result = compose.follow_logs().await;
            debug!(success = result.success, "Log stream ended");
        }

        info!("Automation completed successfully");
        Outcome::Rebuilt { health }
    }

    async fn stop(&self, compose: &ComposeClient<'_>, steps: &mut StepCounter) -> StepResult {
        self.begin(steps, Step::Stop, "Stopping containers...");
        let result = compose.stop().await;
        if result.success {
            self.emit(WorkflowEvent::Success {
                message: result.message.clone(),
            });
        } else {
            self.emit(WorkflowEvent::Error {
                message: format!("Failed to stop containers: {}", result.message),
            });
        }
        result
    }

    fn begin(&self, steps: &mut StepCounter, step: Step, description: &str) {
        self.emit(WorkflowEvent::StepStarted {
            number: steps.next(),
            step,
            description: description.to_string(),
        });
    }

    fn emit(&self, event: WorkflowEvent) {
        self.progress.on_event(&event);
    }
}

/// Reports the `SKIP_DOCKER_REBUILD=1` skip; nothing else runs
pub fn report_suppressed(progress: &dyn ProgressHandler) -> Outcome {
    progress.on_event(&WorkflowEvent::Info {
        message: format!("{}=1 is set - skipping Docker rebuild", SKIP_ENV_VAR),
    });
    Outcome::Suppressed
}

fn log_trigger(classifier: &ChangeClassifier, files: &[String]) {
    let trigger = files
        .iter()
        .find_map(|file| classifier.rebuild_match(file).map(|pattern| (file, pattern)));
    if let Some((file, pattern)) = trigger {
        info!(file = %file, pattern = %pattern, "Rebuild triggered");
    }
}

#[derive(Debug, Default)]
struct StepCounter(usize);

impl StepCounter {
    fn next(&mut self) -> usize {
        self.0 += 1;
        self.0
    }
}
