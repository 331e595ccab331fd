use crate::config::{RedockConfig, DEFAULT_COMPOSE_FILE};
use crate::process::{CommandRunner, Invocation};
use crate::progress::{ProgressHandler, WorkflowEvent};
use crate::step::{Step, StepResult};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Message of the successful result returned when the health probe never passed
pub const HEALTH_TIMEOUT_MESSAGE: &str = "Health check timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// The probe never passed; services may still be starting
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub result: StepResult,
}

impl HealthCheck {
    pub fn timed_out(&self) -> bool {
        self.status == HealthStatus::TimedOut
    }
}

/// Drives `docker-compose` (or whatever `compose_command` names) for one project
pub struct ComposeClient<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a RedockConfig,
}

impl<'a> ComposeClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a RedockConfig) -> Self {
        Self { runner, config }
    }

    /// The compose executable as the user would type it
    pub fn command_display(&self) -> String {
        self.config.compose_command.join(" ")
    }

    /// Builds a compose invocation; `-f` is only passed for a non-default file
    pub fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (program, leading) = match self.config.compose_command.split_first() {
            Some((program, leading)) => (program.clone(), leading.to_vec()),
            None => (String::new(), Vec::new()),
        };

        let mut all_args = leading;
        if self.config.compose_file != DEFAULT_COMPOSE_FILE {
            all_args.push("-f".to_string());
            all_args.push(self.config.compose_file.clone());
        }
        all_args.extend(args.into_iter().map(Into::into));

        Invocation::new(program, all_args, &self.config.project_root)
    }

    /// `<compose> --version`, captured
    pub fn version_invocation(&self) -> Invocation {
        self.invocation(["--version"]).captured()
    }

    /// Stops the project containers; volumes are preserved
    pub async fn stop(&self) -> StepResult {
        self.run_step(Step::Stop, ["down"], "Containers stopped (volumes preserved)")
            .await
    }

    pub async fn build(&self) -> StepResult {
        self.run_step(Step::Build, ["build"], "Images built").await
    }

    pub async fn start(&self) -> StepResult {
        self.run_step(Step::Start, ["up", "-d"], "Containers started")
            .await
    }

    /// Streams container logs until the user interrupts
    pub async fn follow_logs(&self) -> StepResult {
        self.run_step(Step::Logs, ["logs", "-f"], "Log stream closed")
            .await
    }

    /// Polls the configured readiness probe until it passes or the timeout
    /// expires.
    ///
    /// Expiry is not a failure: the step result stays successful and the
    /// status is [`HealthStatus::TimedOut`].
    pub async fn wait_for_health(&self, progress: &dyn ProgressHandler) -> HealthCheck {
        let started = Instant::now();
        let health = &self.config.health;
        let timeout = health.timeout();
        let interval = health.interval();

        let mut probe_args = vec!["exec".to_string(), "-T".to_string(), health.service.clone()];
        probe_args.extend(health.command.iter().cloned());
        let probe = self.invocation(probe_args).captured();

        let mut elapsed = Duration::ZERO;
        while elapsed < timeout {
            match self.runner.run(&probe).await {
                Ok(output) if output.success => {
                    return HealthCheck {
                        status: HealthStatus::Healthy,
                        result: StepResult::succeeded(Step::Health, "Services healthy", started),
                    };
                }
                Ok(output) => debug!(reason = %output.failure_message(), "Health probe not ready"),
                Err(e) => debug!(error = %e, "Health probe could not run"),
            }

            tokio::time::sleep(interval).await;
            elapsed += interval;
            progress.on_event(&WorkflowEvent::HealthWaiting { elapsed, timeout });
        }

        warn!(timeout_secs = timeout.as_secs(), "Health check timed out");
        HealthCheck {
            status: HealthStatus::TimedOut,
            result: StepResult::succeeded(Step::Health, HEALTH_TIMEOUT_MESSAGE, started),
        }
    }

    async fn run_step<const N: usize>(
        &self,
        step: Step,
        args: [&str; N],
        success_message: &str,
    ) -> StepResult {
        let started = Instant::now();
        let invocation = self.invocation(args);

        match self.runner.run(&invocation).await {
            Ok(output) if output.success => StepResult::succeeded(step, success_message, started),
            Ok(output) => StepResult::failed(step, output.failure_message(), started),
            Err(e) => StepResult::failed(step, e.to_string(), started),
        }
    }
}
