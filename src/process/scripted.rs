//! Scripted [`CommandRunner`] for tests

use super::{CommandOutput, CommandRunner, Invocation, RunnerError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replies to command lines with queued responses and records every call.
///
/// Responses are keyed by [`Invocation::command_line`]. When a key has a
/// single response left it is repeated; unknown commands succeed with empty
/// output.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    responses: Mutex<HashMap<String, VecDeque<Result<CommandOutput, String>>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, command_line: &str, output: CommandOutput) -> Self {
        self.push(command_line, Ok(output));
        self
    }

    /// The program cannot be found
    pub(crate) fn missing(self, command_line: &str) -> Self {
        self.push(command_line, Err(command_line.to_string()));
        self
    }

    fn push(&self, command_line: &str, response: Result<CommandOutput, String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(command_line.to_string())
            .or_default()
            .push_back(response);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let key = invocation.command_line();
        self.calls.lock().unwrap().push(invocation.clone());

        let mut responses = self.responses.lock().unwrap();
        let response = match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(_)) => Err(RunnerError::NotFound(invocation.program.clone())),
            None => Ok(CommandOutput::success("")),
        }
    }
}
