//! redock - rebuild a docker-compose development environment after git pull
//!
//! A pull that only touches frontend sources or documentation should not cost
//! a full image rebuild. redock looks at the files changed by the last merge
//! and restarts the containers only when a rebuild-relevant file changed.
//!
//! # Core Concepts
//!
//! - **Change classification**: ordered glob patterns decide whether a change
//!   set requires a rebuild ([`classifier`])
//! - **Workflow**: override flags, prerequisite checks and the
//!   stop/build/start/health sequence ([`workflow`])
//! - **Progress**: the workflow reports through a [`progress::ProgressHandler`]
//!   instead of a global logger
//!
//! # Example Usage
//!
//! ```
//! use redock::classifier::should_rebuild;
//!
//! let changed = ["frontend/src/App.tsx", "backend/pom.xml"];
//! assert!(should_rebuild(&changed, &["backend/**"], &["frontend/**"]));
//! ```

pub mod classifier;
pub mod cli;
pub mod compose;
pub mod config;
pub mod docker;
pub mod git;
pub mod hook;
pub mod process;
pub mod progress;
pub mod step;
pub mod util;
pub mod workflow;

pub use classifier::{ChangeClassifier, Pattern};
pub use config::{ConfigError, RedockConfig};
pub use hook::{HookError, HookInstaller};
pub use step::{Step, StepResult};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use workflow::{Mode, Outcome, RunOptions, Workflow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
