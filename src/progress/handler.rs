//! Progress handler trait and events

use crate::compose::ServiceSummary;
use crate::step::Step;
use std::time::Duration;

/// Events emitted while the workflow runs
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A new section of output
    Header { title: String },

    /// A numbered workflow step begins
    StepStarted { number: usize, step: Step, description: String },

    /// One prerequisite probe finished
    PrerequisiteChecked {
        name: String,
        passed: bool,
        detail: Option<String>,
    },

    /// Indented progress detail within a step
    Detail { message: String },

    Success { message: String },

    Info { message: String },

    Warning { message: String },

    Error { message: String },

    /// Changed files found for a post-merge check; `shown` is a prefix of the
    /// full list whose length is `total`
    ChangedFiles { shown: Vec<String>, total: usize },

    /// Still waiting for the health probe to pass
    HealthWaiting { elapsed: Duration, timeout: Duration },

    /// Services are up
    ServicesRunning {
        services: Vec<ServiceSummary>,
        compose_command: String,
    },
}

/// Receives workflow events; passed explicitly to the workflow
pub trait ProgressHandler: Send + Sync {
    fn on_event(&self, event: &WorkflowEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_event(&self, _event: &WorkflowEvent) {}
}

/// Forwards every event to each inner handler in order
#[derive(Default)]
pub struct CompositeHandler {
    handlers: Vec<Box<dyn ProgressHandler>>,
}

impl CompositeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: impl ProgressHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl ProgressHandler for CompositeHandler {
    fn on_event(&self, event: &WorkflowEvent) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}
