pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{ClassifyArgs, CliArgs, Commands, InstallHookArgs, RunArgs};
pub use output::{ClassifyReport, FileSource, OutputFormat, OutputFormatter};
