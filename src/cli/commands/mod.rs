//! Command execution functions for the release lifecycle.
//!
//! Each executor drives one controller operation and prints guidance for the
//! next manual step. Errors are reported here, once, with recovery
//! suggestions, and mapped to the process exit code.

mod abort;
mod finalize;
mod new;
mod rc;
mod status;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::git::GixRepository;
use crate::release::ReleaseController;
use crate::state::{LOCK_FILE_NAME, StateStore};

use abort::execute_abort;
use finalize::execute_finalize;
use new::execute_new;
use rc::execute_rc;
use status::execute_status;

/// Exit code of a command that failed before completing its effect
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Execute the parsed command and return the process exit code
pub fn execute_command(args: Args) -> i32 {
    let config = RuntimeConfig::from(&args);

    if let Err(validation_error) = args.validate() {
        config.output().error(&format!("Invalid arguments: {}", validation_error));
        return FAILURE_EXIT_CODE;
    }

    let result = match &args.command {
        Command::New { version, base } => execute_new(version, base.as_deref(), &config),
        Command::Rc => execute_rc(&config),
        Command::Finalize => execute_finalize(&config),
        Command::Abort => execute_abort(&config),
        Command::Status { json } => execute_status(*json, &config),
    };

    result.unwrap_or_else(|e| {
        log::debug!("{} failed: {:?}", args.command.name(), e);
        config.output().error(&format!("Command '{}' failed: {}", args.command.name(), e));
        config.output().suggestions(&e.recovery_suggestions());
        FAILURE_EXIT_CODE
    })
}

/// Open the repository and its state store for `config`
fn open_controller(config: &RuntimeConfig) -> Result<ReleaseController<GixRepository>> {
    let repo = GixRepository::discover(&config.repo_dir)?;
    log::debug!(
        "Using work tree {} (git dir {})",
        repo.work_dir().display(),
        repo.git_dir().display()
    );

    // The lock lives in the git dir so nothing is left in the work tree.
    let store =
        StateStore::in_dir(repo.work_dir()).with_lock_file(repo.git_dir().join(LOCK_FILE_NAME));
    Ok(ReleaseController::new(repo, store, config.controller.clone()))
}
