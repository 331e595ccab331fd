//! Progress reporting for workflow operations

mod console;
mod handler;
mod logging;

pub use console::ConsoleHandler;
#[cfg(test)]
pub(crate) use handler::recording::RecordingHandler;
pub use handler::{CompositeHandler, NoOpHandler, ProgressHandler, WorkflowEvent};
pub use logging::{LoggingHandler, PROGRESS_TARGET};
