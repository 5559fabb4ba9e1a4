//! Release lifecycle controller.
//!
//! The controller is the state machine behind the `new`, `rc`, `finalize` and
//! `abort` commands. A release is in progress exactly when the state file
//! exists. Each mutating command takes the state lock, runs all of its guards,
//! and only then touches the repository.
//!
//! `finalize` and `abort` have a second, best-effort phase. Once the release
//! tag exists it is never rolled back; failures while checking out the trunk,
//! deleting the release branch or removing the state file are collected as
//! [`CleanupFailure`]s and reported to the caller.

mod config;
mod guards;
mod results;

pub use config::{ControllerConfig, DEFAULT_BRANCH_PREFIX};
pub use results::{
    AbortResult, CandidateResult, CleanupFailure, CleanupStep, FinalizeResult, NewReleaseResult,
    StatusReport,
};

use crate::error::{LifecycleError, Result};
use crate::git::RepositoryBackend;
use crate::state::{ReleaseState, StateStore, release_branch_name};
use crate::version::VersionSpec;

/// Drives one release through its lifecycle
#[derive(Debug)]
pub struct ReleaseController<B> {
    backend: B,
    store: StateStore,
    config: ControllerConfig,
}

impl<B: RepositoryBackend> ReleaseController<B> {
    /// Create a controller over `backend`, persisting state through `store`
    pub fn new(backend: B, store: StateStore, config: ControllerConfig) -> Self {
        Self {
            backend,
            store,
            config,
        }
    }

    /// Underlying repository backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// State store
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Release branch name for `version` under the configured prefix
    pub fn branch_for(&self, version: &VersionSpec) -> String {
        release_branch_name(&self.config.branch_prefix, version)
    }

    /// Start a release: create the release branch at HEAD and persist state.
    ///
    /// `base` overrides both the configured override and the checked-out
    /// branch as the recorded base.
    pub fn new_release(&self, version: &str, base: Option<&str>) -> Result<NewReleaseResult> {
        let version = VersionSpec::parse(version)?;
        let _lock = self.store.lock()?;

        if self.store.exists() {
            let in_progress = self
                .store
                .load()
                .map(|state| state.version.canonical())
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(LifecycleError::ReleaseAlreadyInProgress {
                version: in_progress,
            }
            .into());
        }

        let tags = self.backend.tag_names()?;
        guards::ensure_tag_absent(&tags, &version.canonical())?;

        let current = self.backend.current_branch()?;
        let explicit = base
            .or(self.config.base_override.as_deref())
            .filter(|b| !b.is_empty());
        let base = guards::resolve_base(explicit, current.as_deref())?;

        let branch = self.branch_for(&version);
        if self.backend.branch_exists(&branch)? {
            return Err(LifecycleError::BranchConflict { branch }.into());
        }

        let (previous, superseded) = guards::previous_release(&tags, &version);
        if superseded {
            log::warn!("{} is not newer than every existing release tag", version);
        }

        log::info!("Initialising new release: {}", version);
        log::info!("Creating release branch: {}", branch);
        let commit = self.backend.head_commit()?;
        self.backend.create_branch(&branch, &commit)?;

        let state = ReleaseState::new(version.clone(), base).with_previous(previous.clone());
        if let Err(e) = self.store.save(&state) {
            log::error!("Couldn't persist release state, removing branch {}", branch);
            if let Err(undo) = self.backend.delete_branch(&branch) {
                log::error!("couldn't remove the branch {}: {}", branch, undo);
            }
            return Err(e);
        }

        Ok(NewReleaseResult {
            version,
            base,
            branch,
            commit,
            previous,
        })
    }

    /// Stamp the next release candidate tag at HEAD of the release branch
    pub fn tag_candidate(&self) -> Result<CandidateResult> {
        let _lock = self.store.lock()?;
        let mut state = self.store.load()?;

        let branch = state.branch(&self.config.branch_prefix);
        guards::ensure_on_branch(self.backend.current_branch()?.as_deref(), &branch)?;

        let tag_name = state.next_candidate_tag()?;
        guards::ensure_tag_absent(&self.backend.tag_names()?, &tag_name)?;

        let head = self.backend.head_commit()?;
        let tag = self.backend.create_lightweight_tag(&tag_name, &head)?;

        state.record_candidate()?;
        self.store.save(&state).inspect_err(|_| {
            log::error!(
                "Tag {} was created but the candidate count was not saved; \
                 delete the tag before running rc again",
                tag_name
            );
        })?;

        log::info!("Release Candidate tag created: {}", tag_name);
        Ok(CandidateResult {
            version: state.version,
            tag,
            num_candidates: state.num_candidates,
        })
    }

    /// Tag the release and return the repository to the trunk branch
    pub fn finalize(&self) -> Result<FinalizeResult> {
        let _lock = self.store.lock()?;
        let state = self.store.load()?;
        log::info!("Finalizing release {}", state.version);

        let branch = state.branch(&self.config.branch_prefix);
        let current = self.backend.current_branch()?;
        log::info!(
            "Current working branch: {}",
            current.as_deref().unwrap_or("(detached)")
        );
        guards::ensure_on_branch(current.as_deref(), &branch)?;

        let tag_name = state.release_tag();
        guards::ensure_tag_absent(&self.backend.tag_names()?, &tag_name)?;

        let head = self.backend.head_commit()?;
        log::info!("Creating annotated tag {:?} on commit {:?}", tag_name, head);
        let message = self.config.generate_tag_message(&tag_name);
        let tag = self
            .backend
            .create_annotated_tag(&tag_name, &head, &message)?;

        log::info!("Release tag {} created, cleaning up now.", tag_name);
        let cleanup_failures = self.finalize_cleanup(&branch);

        Ok(FinalizeResult {
            version: state.version,
            tag,
            cleanup_failures,
        })
    }

    /// Discard the release in progress: delete its branch and state
    pub fn abort(&self) -> Result<AbortResult> {
        let _lock = self.store.lock()?;
        let state = self.store.load()?;
        log::info!("Aborting release: {}", state.version);

        let branch = state.branch(&self.config.branch_prefix);
        let mut cleanup_failures = Vec::new();

        log::info!("Deleting release branch: {}", branch);
        if let Err(failure) = self.delete_release_branch(&branch) {
            cleanup_failures.push(failure);
        }

        log::info!("Prune state file: {}", self.store.path().display());
        if let Err(failure) = self.remove_state() {
            cleanup_failures.push(failure);
        }

        Ok(AbortResult {
            version: state.version,
            branch,
            cleanup_failures,
        })
    }

    /// Describe the release in progress, `None` when idle
    pub fn status(&self) -> Result<Option<StatusReport>> {
        if !self.store.exists() {
            return Ok(None);
        }

        let state = self.store.load()?;
        let branch = state.branch(&self.config.branch_prefix);
        let on_release_branch = self.backend.current_branch()?.as_deref() == Some(branch.as_str());

        Ok(Some(StatusReport {
            next_candidate_tag: state.next_candidate_tag()?,
            release_tag: state.release_tag(),
            branch,
            on_release_branch,
            state_path: self.store.path().to_path_buf(),
            state,
        }))
    }

    fn finalize_cleanup(&self, branch: &str) -> Vec<CleanupFailure> {
        let mut failures = Vec::new();
        let trunk = &self.config.trunk_branch;
        let revision = self.config.remote_trunk();

        let checkout = self
            .backend
            .resolve_revision(&revision)
            .and_then(|target| self.backend.checkout_force_create(trunk, &target));

        match checkout {
            Ok(()) => {
                if let Err(failure) = self.delete_release_branch(branch) {
                    failures.push(failure);
                }
            }
            Err(e) => {
                let failure = CleanupFailure::new(
                    CleanupStep::CheckoutTrunk {
                        branch: trunk.clone(),
                        revision: revision.clone(),
                    },
                    e,
                );
                log::warn!("{}", failure);
                failures.push(failure);

                // The release branch is still checked out.
                let skipped = CleanupFailure::new(
                    CleanupStep::DeleteBranch {
                        branch: branch.to_string(),
                    },
                    format!("skipped because {} could not be checked out", trunk),
                );
                log::warn!("{}", skipped);
                failures.push(skipped);
            }
        }

        if let Err(failure) = self.remove_state() {
            failures.push(failure);
        }

        failures
    }

    fn delete_release_branch(&self, branch: &str) -> std::result::Result<(), CleanupFailure> {
        let step = CleanupStep::DeleteBranch {
            branch: branch.to_string(),
        };

        let outcome = match self.backend.branch_exists(branch) {
            Ok(false) => {
                log::warn!("Release branch {} is already gone", branch);
                Ok(())
            }
            Ok(true) => self.backend.delete_branch(branch),
            Err(e) => Err(e),
        };

        outcome.map_err(|e| {
            let failure = CleanupFailure::new(step, e);
            log::warn!("{}", failure);
            failure
        })
    }

    fn remove_state(&self) -> std::result::Result<(), CleanupFailure> {
        self.store.clear().map_err(|e| {
            let failure = CleanupFailure::new(
                CleanupStep::RemoveState {
                    path: self.store.path().to_path_buf(),
                },
                e,
            );
            log::warn!("{}", failure);
            failure
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReleaseError, StateError};
    use crate::git::{MemoryOp, MemoryRepository};
    use crate::state::BaseBranch;

    fn controller(dir: &tempfile::TempDir) -> ReleaseController<MemoryRepository> {
        ReleaseController::new(
            MemoryRepository::new("develop"),
            StateStore::in_dir(dir.path()),
            ControllerConfig::default(),
        )
    }

    #[test]
    fn new_records_base_and_previous_release() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.backend().add_tag("v1.1.0");
        ctl.backend().add_tag("v1.1.1-pre1");

        let result = ctl.new_release("1.2.0", None).unwrap();

        assert_eq!(result.branch, "release/1.2.0");
        assert_eq!(result.base, BaseBranch::Develop);
        assert_eq!(result.previous.unwrap().canonical(), "v1.1.0");
        assert_eq!(
            ctl.backend().branch_target("release/1.2.0").unwrap(),
            ctl.backend().head()
        );
        // The release branch is created but not checked out.
        assert_eq!(
            ctl.backend().current_branch().unwrap().as_deref(),
            Some("develop")
        );

        let state = ctl.store().load().unwrap();
        assert_eq!(state.num_candidates, 0);
        assert_eq!(state.version.canonical(), "v1.2.0");
    }

    #[test]
    fn invalid_version_is_rejected_before_any_state_check() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.0.0", None).unwrap();

        assert!(matches!(
            ctl.new_release("not-a-version", None),
            Err(ReleaseError::Version(_))
        ));
    }

    #[test]
    fn existing_release_branch_blocks_new() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.backend().checkout_new("release/1.2.0");
        ctl.backend().checkout("develop");

        assert!(matches!(
            ctl.new_release("1.2.0", None),
            Err(ReleaseError::Lifecycle(LifecycleError::BranchConflict { .. }))
        ));
        assert!(!ctl.store().exists());
    }

    #[test]
    fn configured_base_override_applies_when_no_base_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = ReleaseController::new(
            MemoryRepository::new("feature/login"),
            StateStore::in_dir(dir.path()),
            ControllerConfig {
                base_override: Some("staging".to_string()),
                ..Default::default()
            },
        );

        let result = ctl.new_release("2.0.0", None).unwrap();
        assert_eq!(result.base, BaseBranch::Staging);
    }

    #[test]
    fn failed_branch_creation_leaves_no_state() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.backend().fail_on(MemoryOp::CreateBranch);

        assert!(matches!(
            ctl.new_release("1.2.0", None),
            Err(ReleaseError::Git(_))
        ));
        assert!(!ctl.store().exists());
    }

    #[test]
    fn candidate_tags_point_at_release_branch_head() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");
        let fix = ctl.backend().commit();

        let result = ctl.tag_candidate().unwrap();

        assert_eq!(result.tag.name, "v1.2.0-pre1");
        assert_eq!(result.tag.target_commit, fix);
        assert!(!result.tag.is_annotated);
        assert_eq!(result.num_candidates, 1);
    }

    #[test]
    fn preexisting_candidate_tag_is_a_conflict_and_counter_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");
        ctl.backend().add_tag("v1.2.0-pre1");

        assert!(matches!(
            ctl.tag_candidate(),
            Err(ReleaseError::Lifecycle(LifecycleError::TagConflict { .. }))
        ));
        assert_eq!(ctl.store().load().unwrap().num_candidates, 0);
    }

    #[test]
    fn exhausted_candidate_counter_stops_rc_before_tagging() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");

        let mut state = ctl.store().load().unwrap();
        state.num_candidates = u32::MAX;
        ctl.store().save(&state).unwrap();

        assert!(matches!(
            ctl.tag_candidate(),
            Err(ReleaseError::State(StateError::Corrupted { .. }))
        ));
        assert!(ctl.backend().tag_names().unwrap().is_empty());
        assert_eq!(ctl.store().load().unwrap().num_candidates, u32::MAX);
    }

    #[test]
    fn finalize_tags_and_returns_to_trunk() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        let trunk_head = ctl.backend().head();
        ctl.backend().set_remote_ref("origin/main", &trunk_head);
        ctl.backend().checkout("release/1.2.0");
        let release_head = ctl.backend().commit();

        let result = ctl.finalize().unwrap();

        assert!(result.is_clean());
        assert!(result.tag.is_annotated);
        assert_eq!(result.tag.target_commit, release_head);
        assert_eq!(result.tag.message.as_deref(), Some("Release v1.2.0"));
        assert_eq!(
            ctl.backend().current_branch().unwrap().as_deref(),
            Some("main")
        );
        assert_eq!(ctl.backend().branch_target("main").unwrap(), trunk_head);
        assert!(!ctl.backend().branch_exists("release/1.2.0").unwrap());
        assert!(!ctl.store().exists());
    }

    #[test]
    fn finalize_keeps_tag_when_trunk_checkout_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");

        // No origin/main ref: resolution fails.
        let result = ctl.finalize().unwrap();

        assert!(ctl.backend().tag("v1.2.0").is_some());
        assert_eq!(result.cleanup_failures.len(), 2);
        assert!(matches!(
            result.cleanup_failures[0].step,
            CleanupStep::CheckoutTrunk { .. }
        ));
        assert!(ctl.backend().branch_exists("release/1.2.0").unwrap());
        assert!(!ctl.store().exists());
    }

    #[test]
    fn failed_tag_creation_leaves_release_in_progress() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");
        ctl.backend().fail_on(MemoryOp::CreateTag);

        assert!(ctl.finalize().is_err());
        assert!(ctl.store().exists());
        assert!(ctl.backend().branch_exists("release/1.2.0").unwrap());
    }

    #[test]
    fn abort_attempts_both_deletions() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().fail_on(MemoryOp::DeleteBranch);

        let result = ctl.abort().unwrap();

        assert!(!result.is_clean());
        assert_eq!(result.cleanup_failures.len(), 1);
        assert!(!ctl.store().exists());
        assert!(ctl.backend().branch_exists("release/1.2.0").unwrap());
    }

    #[test]
    fn abort_tolerates_already_deleted_branch() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().delete_branch("release/1.2.0").unwrap();

        let result = ctl.abort().unwrap();
        assert!(result.is_clean());
    }

    #[test]
    fn status_reflects_progress() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller(&dir);
        assert!(ctl.status().unwrap().is_none());

        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");
        ctl.tag_candidate().unwrap();

        let report = ctl.status().unwrap().unwrap();
        assert!(report.on_release_branch);
        assert_eq!(report.next_candidate_tag, "v1.2.0-pre2");
        assert_eq!(report.release_tag, "v1.2.0");
        assert!(report.format_report().contains("1 candidate(s)"));
    }
}
