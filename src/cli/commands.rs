use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::workflow::{Mode, RunOptions};

/// Rebuilds a docker-compose environment after git pull when the changes warrant it
#[derive(Parser, Debug)]
#[command(
    name = "redock",
    about = "Rebuilds a docker-compose environment after git pull when the changes warrant it",
    version,
    author,
    long_about = "redock inspects the files changed by a git pull and rebuilds the \
                  docker-compose development environment only when backend or Docker files \
                  changed. Frontend and documentation changes leave the running \
                  containers alone.\n\n\
                  Set SKIP_DOCKER_REBUILD=1 to skip the workflow entirely."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Project root containing the compose file (defaults to current directory)"
    )]
    pub project: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        long = "rebuild-pattern",
        global = true,
        value_name = "GLOB",
        help = "Pattern that triggers a rebuild (repeatable, replaces the configured list)"
    )]
    pub rebuild_patterns: Vec<String>,

    #[arg(
        long = "skip-pattern",
        global = true,
        value_name = "GLOB",
        help = "Pattern reported as safe to skip (repeatable, replaces the configured list)"
    )]
    pub skip_patterns: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Stop, rebuild and restart the containers",
        long_about = "Runs the rebuild workflow: prerequisite checks, then stop, build, start \
                      and a health check. With --post-merge the rebuild only happens when \
                      the files changed by the last merge match a rebuild pattern.\n\n\
                      Examples:\n  \
                      redock run\n  \
                      redock run --post-merge\n  \
                      redock run --force --logs\n  \
                      redock --project ../app run --rebuild"
    )]
    Run(RunArgs),

    #[command(about = "Stop the containers (volumes are preserved)")]
    Stop,

    #[command(
        about = "Show how changed files are classified",
        long_about = "Classifies each file against the rebuild and skip patterns and prints \
                      the rebuild decision. Without FILES the files changed by the last merge \
                      are asked from git.\n\n\
                      Examples:\n  \
                      redock classify\n  \
                      redock classify backend/pom.xml frontend/app.js\n  \
                      redock classify --format json README.md"
    )]
    Classify(ClassifyArgs),

    #[command(about = "Install the git post-merge hook")]
    InstallHook(InstallHookArgs),

    #[command(about = "Remove the git post-merge hook")]
    UninstallHook,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long, help = "Rebuild without looking at changed files")]
    pub rebuild: bool,

    #[arg(long, help = "Force a rebuild, even from the post-merge hook")]
    pub force: bool,

    #[arg(long, help = "Invoked from the git post-merge hook")]
    pub post_merge: bool,

    #[arg(long, help = "Follow container logs after startup")]
    pub logs: bool,
}

impl RunArgs {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            mode: if self.rebuild {
                Mode::Rebuild
            } else {
                Mode::Auto
            },
            force: self.force,
            post_merge: self.post_merge,
            show_logs: self.logs,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(value_name = "FILES", help = "Repository-relative paths to classify")]
    pub files: Vec<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct InstallHookArgs {
    #[arg(short = 'y', long, help = "Overwrite an existing hook without asking")]
    pub yes: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
