//! Outcome of a single lifecycle step

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Prerequisites,
    Stop,
    Build,
    Start,
    Health,
    Logs,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Prerequisites => "prerequisites",
            Step::Stop => "stop",
            Step::Build => "build",
            Step::Start => "start",
            Step::Health => "health",
            Step::Logs => "logs",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures are reported through this value rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub success: bool,
    pub message: String,
    pub step: Step,
    pub duration: Duration,
}

impl StepResult {
    pub fn succeeded(step: Step, message: impl Into<String>, started: Instant) -> Self {
        Self {
            success: true,
            message: message.into(),
            step,
            duration: started.elapsed(),
        }
    }

    pub fn failed(step: Step, message: impl Into<String>, started: Instant) -> Self {
        Self {
            success: false,
            message: message.into(),
            step,
            duration: started.elapsed(),
        }
    }
}
