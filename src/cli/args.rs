//! Command line argument parsing and validation.

use crate::release::{ControllerConfig, DEFAULT_BRANCH_PREFIX};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release branch and tag management
#[derive(Parser, Debug)]
#[command(
    name = "releasectl",
    version,
    about = "Drive the git branching operations of a release process",
    long_about = "This program assists the release manager in dealing with
the git branching operations and procedures that are
required to be performed by the release process.

Usage:
  releasectl new 1.4.0          # cut release/1.4.0 off develop or staging
  releasectl rc                 # tag v1.4.0-pre1, v1.4.0-pre2, ...
  releasectl finalize           # tag v1.4.0 and return to main
  releasectl abort              # discard the release in progress"
)]
pub struct Args {
    /// Release branch prefix
    #[arg(
        long,
        global = true,
        env = "RELEASECTL_PREFIX",
        default_value = DEFAULT_BRANCH_PREFIX
    )]
    pub prefix: String,

    /// Branch checked out after finalizing
    #[arg(long, global = true, env = "RELEASECTL_TRUNK", default_value = "main")]
    pub trunk: String,

    /// Remote holding the trunk branch
    #[arg(long, global = true, env = "RELEASECTL_REMOTE", default_value = "origin")]
    pub remote: String,

    /// Run as if started in DIR
    #[arg(short = 'C', long = "repo", global = true, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Release lifecycle commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initiate a new release.
    New {
        /// Version to release, e.g. 1.4.0 or v1.4.0
        version: String,

        /// Branch off which the release is cut; the current branch by default
        #[arg(short = 'b', long, value_name = "BRANCH")]
        base: Option<String>,
    },

    /// Cancel the release process currently ongoing and roll back changes.
    Abort,

    /// Create a lightweight tag for a pre-release milestone (RC).
    Rc,

    /// Finalize and tag the release.
    Finalize,

    /// Show the release currently in progress.
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::New { .. } => "new",
            Command::Abort => "abort",
            Command::Rc => "rc",
            Command::Finalize => "finalize",
            Command::Status { .. } => "status",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::New { version, .. } = &self.command
            && version.trim().is_empty()
        {
            return Err("the command \"new\" takes a version argument".to_string());
        }

        self.controller_config()
            .validate()
            .map_err(|e| e.to_string())
    }

    /// Controller configuration described by these arguments
    pub fn controller_config(&self) -> ControllerConfig {
        let base_override = match &self.command {
            Command::New { base, .. } => base.clone(),
            _ => None,
        };

        ControllerConfig {
            branch_prefix: self.prefix.clone(),
            base_override,
            trunk_branch: self.trunk.clone(),
            remote: self.remote.clone(),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug)]
pub struct RuntimeConfig {
    /// Terminal output for guidance and diagnostics
    output: super::OutputManager,
    /// Directory repository discovery starts from
    pub repo_dir: PathBuf,
    /// Controller configuration
    pub controller: ControllerConfig,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(),
            repo_dir: args.repo.clone().unwrap_or_else(|| PathBuf::from(".")),
            controller: args.controller_config(),
        }
    }
}

impl RuntimeConfig {
    /// Terminal output
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}
