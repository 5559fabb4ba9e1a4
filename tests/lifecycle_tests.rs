#[cfg(test)]
mod tests {
    use releasectl::error::{LifecycleError, ReleaseError, StateError};
    use releasectl::git::{MemoryRepository, RepositoryBackend};
    use releasectl::release::{ControllerConfig, ReleaseController};
    use releasectl::state::{BaseBranch, StateStore};
    use std::time::Duration;
    use tempfile::TempDir;

    fn controller_on(dir: &TempDir, branch: &str) -> ReleaseController<MemoryRepository> {
        ReleaseController::new(
            MemoryRepository::new(branch),
            StateStore::in_dir(dir.path()),
            ControllerConfig::default(),
        )
    }

    fn lifecycle_error(result: Result<impl std::fmt::Debug, ReleaseError>) -> LifecycleError {
        match result {
            Err(ReleaseError::Lifecycle(e)) => e,
            other => panic!("expected a lifecycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_while_in_progress_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");
        ctl.new_release("1.2.0", None).unwrap();

        let err = lifecycle_error(ctl.new_release("1.3.0", None));
        assert_eq!(
            err,
            LifecycleError::ReleaseAlreadyInProgress {
                version: "v1.2.0".to_string()
            }
        );
        assert!(!ctl.backend().branch_exists("release/1.3.0").unwrap());
    }

    #[test]
    fn test_new_then_abort_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");

        ctl.new_release("1.2.0", None).unwrap();
        assert!(ctl.store().exists());
        assert!(ctl.backend().branch_exists("release/1.2.0").unwrap());

        let result = ctl.abort().unwrap();
        assert!(result.is_clean());
        assert!(!ctl.store().exists());
        assert_eq!(ctl.backend().branches(), vec!["develop".to_string()]);
        assert!(ctl.status().unwrap().is_none());

        // The same version can be started again.
        ctl.new_release("1.2.0", None).unwrap();
    }

    #[test]
    fn test_three_candidates_are_numbered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "staging");
        ctl.new_release("v1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");

        let mut tags = Vec::new();
        for _ in 0..3 {
            ctl.backend().commit();
            tags.push(ctl.tag_candidate().unwrap().tag.name);
        }

        assert_eq!(tags, vec!["v1.2.0-pre1", "v1.2.0-pre2", "v1.2.0-pre3"]);
        let state = ctl.store().load().unwrap();
        assert_eq!(state.num_candidates, 3);
        assert_eq!(state.base, BaseBranch::Staging);
        for tag in &tags {
            assert!(ctl.backend().tag_exists(tag).unwrap());
        }
    }

    #[test]
    fn test_rc_off_the_release_branch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");
        ctl.new_release("1.2.0", None).unwrap();

        let err = lifecycle_error(ctl.tag_candidate());
        assert_eq!(
            err,
            LifecycleError::WrongBranch {
                expected: "release/1.2.0".to_string(),
                current: "develop".to_string(),
            }
        );
        assert_eq!(ctl.store().load().unwrap().num_candidates, 0);
    }

    #[test]
    fn test_rc_without_release_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");

        assert_eq!(
            lifecycle_error(ctl.tag_candidate()),
            LifecycleError::NoActiveRelease
        );
        assert_eq!(lifecycle_error(ctl.abort()), LifecycleError::NoActiveRelease);
        assert_eq!(
            lifecycle_error(ctl.finalize()),
            LifecycleError::NoActiveRelease
        );
    }

    #[test]
    fn test_finalize_off_the_release_branch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");
        ctl.new_release("1.2.0", None).unwrap();

        assert!(matches!(
            lifecycle_error(ctl.finalize()),
            LifecycleError::WrongBranch { .. }
        ));
        assert!(ctl.backend().tag("v1.2.0").is_none());
        assert!(ctl.store().exists());
    }

    #[test]
    fn test_finalize_with_existing_release_tag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");
        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");
        // Created by hand after the release started.
        ctl.backend().add_tag("v1.2.0");

        assert_eq!(
            lifecycle_error(ctl.finalize()),
            LifecycleError::TagConflict {
                tag: "v1.2.0".to_string()
            }
        );
        assert!(ctl.store().exists());
        assert!(ctl.backend().branch_exists("release/1.2.0").unwrap());
    }

    #[test]
    fn test_new_with_existing_release_tag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");
        ctl.backend().add_tag("1.2.0");

        assert!(matches!(
            lifecycle_error(ctl.new_release("v1.2", None)),
            LifecycleError::TagConflict { .. }
        ));
        assert!(!ctl.store().exists());
        assert!(!ctl.backend().branch_exists("release/1.2.0").unwrap());
    }

    #[test]
    fn test_new_from_feature_branch_needs_explicit_base() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "feature/login");

        assert_eq!(
            lifecycle_error(ctl.new_release("1.2.0", None)),
            LifecycleError::InvalidBaseBranch {
                branch: "feature/login".to_string()
            }
        );
        assert!(matches!(
            lifecycle_error(ctl.new_release("1.2.0", Some("main"))),
            LifecycleError::InvalidBaseBranch { .. }
        ));

        let result = ctl.new_release("1.2.0", Some("develop")).unwrap();
        assert_eq!(result.base, BaseBranch::Develop);
    }

    #[test]
    fn test_full_release_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_on(&dir, "develop");
        ctl.backend().add_tag("v1.1.0");
        let trunk = ctl.backend().head();
        ctl.backend().set_remote_ref("origin/main", &trunk);

        ctl.new_release("1.2.0", None).unwrap();
        ctl.backend().checkout("release/1.2.0");
        ctl.backend().commit();
        ctl.tag_candidate().unwrap();
        let fixed = ctl.backend().commit();
        ctl.tag_candidate().unwrap();

        let result = ctl.finalize().unwrap();

        assert!(result.is_clean());
        assert_eq!(result.tag.target_commit, fixed);
        assert_eq!(
            ctl.backend().tag("v1.2.0-pre2").unwrap().target_commit,
            fixed
        );
        assert_eq!(
            ctl.backend().current_branch().unwrap().as_deref(),
            Some("main")
        );
        assert!(!ctl.backend().branch_exists("release/1.2.0").unwrap());
        assert!(ctl.status().unwrap().is_none());

        // The next release sees the one just finalized.
        let next = ctl.new_release("1.3.0", Some("develop")).unwrap();
        assert_eq!(next.previous.unwrap().canonical(), "v1.2.0");
    }

    #[test]
    fn test_custom_prefix_and_trunk() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = ReleaseController::new(
            MemoryRepository::new("develop"),
            StateStore::in_dir(dir.path()),
            ControllerConfig {
                branch_prefix: "rel".to_string(),
                trunk_branch: "master".to_string(),
                remote: "upstream".to_string(),
                ..Default::default()
            },
        );
        let head = ctl.backend().head();
        ctl.backend().set_remote_ref("upstream/master", &head);

        let started = ctl.new_release("2.0.0", None).unwrap();
        assert_eq!(started.branch, "rel/2.0.0");

        ctl.backend().checkout("rel/2.0.0");
        let result = ctl.finalize().unwrap();
        assert!(result.is_clean());
        assert_eq!(
            ctl.backend().current_branch().unwrap().as_deref(),
            Some("master")
        );
    }

    #[test]
    fn test_held_lock_blocks_commands() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = ReleaseController::new(
            MemoryRepository::new("develop"),
            StateStore::in_dir(dir.path()).with_lock_timeout(Duration::from_millis(200)),
            ControllerConfig::default(),
        );
        let other = StateStore::in_dir(dir.path());
        let _held = other.lock().unwrap();

        assert!(matches!(
            ctl.new_release("1.2.0", None),
            Err(ReleaseError::State(StateError::LockTimeout { .. }))
        ));
        assert!(!ctl.store().exists());
    }
}
