//! Subcommand handlers
//!
//! Each handler returns the process exit code. Errors are reported here, so
//! `main` only has to exit with the code.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error};

use super::commands::{ClassifyArgs, CliArgs, Commands, InstallHookArgs, RunArgs};
use super::output::{ClassifyReport, FileSource, OutputFormatter};
use crate::config::{RedockConfig, SKIP_ENV_VAR};
use crate::docker::BollardProbe;
use crate::git::GitClient;
use crate::hook::HookInstaller;
use crate::process::SystemRunner;
use crate::progress::{CompositeHandler, ConsoleHandler, LoggingHandler};
use crate::workflow::{report_suppressed, Mode, RunOptions, Workflow};

/// `--project`, or the current directory
pub fn project_root(args: &CliArgs) -> Result<PathBuf> {
    match &args.project {
        Some(project) => Ok(project.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

/// Loads the layered configuration and applies the command-line overrides
pub fn load_config(args: &CliArgs) -> Result<RedockConfig> {
    let root = project_root(args)?;
    let mut config = RedockConfig::load(&root)
        .with_context(|| format!("Failed to load configuration for {}", root.display()))?;

    if !args.rebuild_patterns.is_empty() {
        config.rebuild_patterns = args.rebuild_patterns.clone();
    }
    if !args.skip_patterns.is_empty() {
        config.skip_patterns = args.skip_patterns.clone();
    }

    debug!(config = ?config, "Configuration loaded");
    Ok(config)
}

pub async fn dispatch(args: &CliArgs, config: &RedockConfig) -> i32 {
    match &args.command {
        Commands::Run(run_args) => handle_run(config, run_args, args.quiet).await,
        Commands::Stop => handle_stop(config, args.quiet).await,
        Commands::Classify(classify_args) => handle_classify(config, classify_args).await,
        Commands::InstallHook(hook_args) => handle_install_hook(config, hook_args),
        Commands::UninstallHook => handle_uninstall_hook(config),
    }
}

/// `SKIP_DOCKER_REBUILD=1` on `run` or `stop`, decided without loading any config
pub fn skip_requested<F>(command: &Commands, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    matches!(command, Commands::Run(_) | Commands::Stop)
        && lookup(SKIP_ENV_VAR).as_deref() == Some("1")
}

pub fn handle_suppressed(quiet: bool) -> i32 {
    report_suppressed(&progress_handler(quiet)).exit_code()
}

pub async fn handle_run(config: &RedockConfig, run_args: &RunArgs, quiet: bool) -> i32 {
    run_workflow(config, &run_args.options(), quiet).await
}

pub async fn handle_stop(config: &RedockConfig, quiet: bool) -> i32 {
    let options = RunOptions {
        mode: Mode::Stop,
        ..Default::default()
    };
    run_workflow(config, &options, quiet).await
}

async fn run_workflow(config: &RedockConfig, options: &RunOptions, quiet: bool) -> i32 {
    let runner = SystemRunner;
    let daemon = BollardProbe;
    let progress = progress_handler(quiet);

    let outcome = Workflow::new(config, &runner, &daemon, &progress)
        .run(options)
        .await;
    debug!(outcome = ?outcome, "Workflow finished");
    outcome.exit_code()
}

/// Console output unless quiet; events always reach the log
fn progress_handler(quiet: bool) -> CompositeHandler {
    let handler = CompositeHandler::new().with(LoggingHandler);
    if quiet {
        handler
    } else {
        handler.with(ConsoleHandler)
    }
}

pub async fn handle_classify(config: &RedockConfig, args: &ClassifyArgs) -> i32 {
    report(classify(config, args).await)
}

async fn classify(config: &RedockConfig, args: &ClassifyArgs) -> Result<i32> {
    let (source, files) = if args.files.is_empty() {
        let runner = SystemRunner;
        let files = GitClient::new(&runner, &config.project_root)
            .changed_files()
            .await;
        (FileSource::Git, files)
    } else {
        (FileSource::Arguments, args.files.clone())
    };

    let classifier = config.classifier();
    let report = ClassifyReport {
        source,
        rebuild: classifier.should_rebuild(&files),
        files: classifier.explain(&files),
    };

    let output = OutputFormatter::new(args.format.into()).format(&report)?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(0)
}

pub fn handle_install_hook(config: &RedockConfig, args: &InstallHookArgs) -> i32 {
    report(install_hook(config, args))
}

fn install_hook(config: &RedockConfig, args: &InstallHookArgs) -> Result<i32> {
    let installer = HookInstaller::for_current_exe(&config.project_root);

    let overwrite = if installer.is_installed() && !args.yes {
        let question = format!(
            "Hook already exists at {}. Overwrite?",
            installer.hook_path().display()
        );
        if !atty::is(atty::Stream::Stdin) {
            bail!(
                "Hook already exists at {}. Re-run with --yes to overwrite",
                installer.hook_path().display()
            );
        }
        if !confirm(&question)? {
            println!("Installation cancelled");
            return Ok(0);
        }
        true
    } else {
        args.yes
    };

    let path = installer
        .install(overwrite)
        .context("Failed to install git hook")?;

    println!("✓ Installed post-merge hook at {}", path.display());
    println!();
    println!("The hook runs after every git pull and rebuilds the containers when needed.");
    println!("Set SKIP_DOCKER_REBUILD=1 to skip it for a single pull.");
    Ok(0)
}

pub fn handle_uninstall_hook(config: &RedockConfig) -> i32 {
    let installer = HookInstaller::for_current_exe(&config.project_root);
    report(
        installer
            .uninstall()
            .context("Failed to uninstall git hook")
            .map(|removed| {
                if removed {
                    println!("✓ Removed post-merge hook");
                } else {
                    println!("ℹ No post-merge hook installed");
                }
                0
            }),
    )
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prints an error chain and maps it to exit code 1
pub fn report(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormatArg;
    use clap::Parser;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_skip_requested_only_for_workflow_commands() {
        let set = |key: &str| (key == SKIP_ENV_VAR).then(|| "1".to_string());
        let unset = |_: &str| -> Option<String> { None };

        let run = CliArgs::parse_from(["redock", "run", "--force"]).command;
        let stop = CliArgs::parse_from(["redock", "stop"]).command;
        let classify = CliArgs::parse_from(["redock", "classify"]).command;

        assert!(skip_requested(&run, set));
        assert!(skip_requested(&stop, set));
        assert!(!skip_requested(&classify, set));
        assert!(!skip_requested(&run, unset));
        assert!(!skip_requested(&run, |_: &str| Some("true".to_string())));
    }

    #[test]
    fn test_handle_suppressed_exits_zero() {
        assert_eq!(handle_suppressed(true), 0);
    }

    #[test]
    fn test_report_maps_errors() {
        assert_eq!(report(Ok(0)), 0);
        assert_eq!(report(Err(anyhow::anyhow!("boom"))), 1);
    }

    #[test]
    #[serial]
    fn test_load_config_applies_cli_patterns() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("redock.toml"),
            "[patterns]\nrebuild = [\"api/**\"]\nskip = [\"web/**\"]\n",
        )
        .unwrap();
        let project = dir.path().display().to_string();

        let args = CliArgs::parse_from(["redock", "--project", &project, "classify"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.rebuild_patterns, vec!["api/**"]);
        assert_eq!(config.skip_patterns, vec!["web/**"]);

        let args = CliArgs::parse_from([
            "redock",
            "--project",
            &project,
            "--rebuild-pattern",
            "services/**",
            "classify",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.rebuild_patterns, vec!["services/**"]);
        assert_eq!(config.skip_patterns, vec!["web/**"]);
    }

    #[test]
    #[serial]
    fn test_load_config_rejects_bad_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("redock.toml"), "unknown_key = 1\n").unwrap();
        let project = dir.path().display().to_string();

        let args = CliArgs::parse_from(["redock", "--project", &project, "stop"]);
        assert!(load_config(&args).is_err());
    }

    #[tokio::test]
    async fn test_classify_explicit_files() {
        let config = RedockConfig::new("/repo");
        let args = ClassifyArgs {
            files: vec!["frontend/app.js".to_string()],
            format: OutputFormatArg::Json,
        };
        assert_eq!(classify(&config, &args).await.unwrap(), 0);
    }

    #[test]
    fn test_install_and_uninstall_hook() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();
        let config = RedockConfig::new(dir.path());

        assert_eq!(
            handle_install_hook(&config, &InstallHookArgs { yes: false }),
            0
        );
        assert!(dir.path().join(".git/hooks/post-merge").is_file());

        // Overwriting without a prompt needs --yes
        assert_eq!(handle_install_hook(&config, &InstallHookArgs { yes: true }), 0);

        assert_eq!(handle_uninstall_hook(&config), 0);
        assert!(!dir.path().join(".git/hooks/post-merge").exists());
    }

    #[test]
    fn test_install_hook_outside_repository() {
        let dir = TempDir::new().unwrap();
        let config = RedockConfig::new(dir.path());
        assert_eq!(
            handle_install_hook(&config, &InstallHookArgs { yes: true }),
            1
        );
    }
}
