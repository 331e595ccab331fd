//! External process execution
//!
//! Every external tool (git, docker, compose) is invoked through the
//! [`CommandRunner`] trait so the workflow can be exercised without them.

mod runner;
#[cfg(test)]
pub(crate) mod scripted;

pub use runner::{CommandOutput, CommandRunner, Invocation, RunnerError, SystemRunner};
