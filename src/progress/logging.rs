//! Logging-based progress handler

use super::{ProgressHandler, WorkflowEvent};
use tracing::{error, info, warn};

/// Target used for every event this handler logs, so a terminal layer can
/// leave them to the console handler
pub const PROGRESS_TARGET: &str = "redock::progress";

/// Handler that logs workflow events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_event(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::Header { title } => {
                info!(target: PROGRESS_TARGET, "{}", title);
            }
            WorkflowEvent::StepStarted {
                number,
                step,
                description,
            } => {
                info!(target: PROGRESS_TARGET, number, step = %step, "[{}] {}", number, description);
            }
            WorkflowEvent::PrerequisiteChecked {
                name,
                passed,
                detail,
            } => {
                if *passed {
                    info!(target: PROGRESS_TARGET, check = %name, detail = ?detail, "Prerequisite available");
                } else {
                    warn!(target: PROGRESS_TARGET, check = %name, "Prerequisite missing");
                }
            }
            WorkflowEvent::Detail { message } | WorkflowEvent::Info { message } => {
                info!(target: PROGRESS_TARGET, "{}", message);
            }
            WorkflowEvent::Success { message } => {
                info!(target: PROGRESS_TARGET, success = true, "{}", message);
            }
            WorkflowEvent::Warning { message } => {
                warn!(target: PROGRESS_TARGET, "{}", message);
            }
            WorkflowEvent::Error { message } => {
                error!(target: PROGRESS_TARGET, "{}", message);
            }
            WorkflowEvent::ChangedFiles { shown, total } => {
                info!(target: PROGRESS_TARGET, total, files = ?shown, "Changed files");
            }
            WorkflowEvent::HealthWaiting { elapsed, timeout } => {
                info!(
                    target: PROGRESS_TARGET,
                    elapsed_secs = elapsed.as_secs(),
                    timeout_secs = timeout.as_secs(),
                    "Waiting for services"
                );
            }
            WorkflowEvent::ServicesRunning { services, .. } => {
                let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
                info!(target: PROGRESS_TARGET, services = ?names, "Services are running");
            }
        }
    }
}
