//! Human-readable terminal output

use super::{ProgressHandler, WorkflowEvent};

const RULE_WIDTH: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

/// Prints workflow events for a person watching the terminal.
///
/// Errors go to stderr, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHandler;

impl ConsoleHandler {
    pub(crate) fn render(event: &WorkflowEvent) -> (Stream, String) {
        let text = match event {
            WorkflowEvent::Header { title } => {
                let rule = "=".repeat(RULE_WIDTH);
                format!("\n{}\n  {}\n{}", rule, title, rule)
            }
            WorkflowEvent::StepStarted {
                number,
                description,
                ..
            } => format!("\n[{}] {}", number, description),
            WorkflowEvent::PrerequisiteChecked {
                name,
                passed,
                detail,
            } => match (passed, detail) {
                (true, Some(detail)) => format!("Checking {}... ✓ ({})", name, detail),
                (true, None) => format!("Checking {}... ✓", name),
                (false, _) => format!("Checking {}... ✗", name),
            },
            WorkflowEvent::Detail { message } => format!("    {}", message),
            WorkflowEvent::Success { message } => format!("✓ {}", message),
            WorkflowEvent::Info { message } => format!("ℹ {}", message),
            WorkflowEvent::Warning { message } => format!("⚠ {}", message),
            WorkflowEvent::Error { message } => {
                return (Stream::Stderr, format!("✗ {}", message));
            }
            WorkflowEvent::ChangedFiles { shown, total } => {
                let mut lines: Vec<String> =
                    shown.iter().map(|file| format!("    - {}", file)).collect();
                if *total > shown.len() {
                    lines.push(format!("    ... and {} more", total - shown.len()));
                }
                lines.join("\n")
            }
            WorkflowEvent::HealthWaiting { elapsed, timeout } => format!(
                "    Waiting... ({}s/{}s)",
                elapsed.as_secs(),
                timeout.as_secs()
            ),
            WorkflowEvent::ServicesRunning {
                services,
                compose_command,
            } => {
                let rule = "=".repeat(RULE_WIDTH);
                let mut out = format!("\n{}\n  Services are running\n{}\n", rule, rule);
                if services.is_empty() {
                    out.push_str("\n  (no services listed in the compose file)\n");
                }
                for service in services {
                    out.push_str(&format!("\n  {}", service.name));
                    if let Some(image) = &service.image {
                        out.push_str(&format!(" ({})", image));
                    }
                    out.push('\n');
                    for port in &service.ports {
                        out.push_str(&format!("    port {}\n", port));
                    }
                }
                out.push_str("\n  Quick commands:\n");
                out.push_str(&format!("    View logs: {} logs -f\n", compose_command));
                out.push_str(&format!("    Stop all:  {} down\n", compose_command));
                out.push_str(&format!("    Restart:   {} restart\n", compose_command));
                out
            }
        };

        (Stream::Stdout, text)
    }
}

impl ProgressHandler for ConsoleHandler {
    fn on_event(&self, event: &WorkflowEvent) {
        match Self::render(event) {
            (Stream::Stdout, text) => println!("{}", text),
            (Stream::Stderr, text) => eprintln!("{}", text),
        }
    }
}
