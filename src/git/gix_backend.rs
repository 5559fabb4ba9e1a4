//! RepositoryBackend implementation on top of gix.
//!
//! Reference reads and writes, tag creation and revision parsing go through
//! gix. The checkout that rewrites the work tree is delegated to the system
//! `git` binary, since it must update the index and files as well as HEAD.

use crate::error::{GitError, Result};
use crate::git::{RepositoryBackend, TagInfo};
use gix::refs::transaction::PreviousValue;
use std::path::{Path, PathBuf};
use std::process::Command;

const BRANCH_REF_PREFIX: &str = "refs/heads/";
const TAG_REF_PREFIX: &str = "refs/tags/";

/// Git repository opened with gix
#[derive(Debug)]
pub struct GixRepository {
    repo: gix::Repository,
    work_dir: PathBuf,
}

impl GixRepository {
    /// Discover the repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = gix::discover(path.as_ref()).map_err(|e| GitError::NotRepository {
            reason: e.to_string(),
        })?;

        let work_dir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository {
                path: repo.path().to_path_buf(),
            })?
            .to_path_buf();

        Ok(Self { repo, work_dir })
    }

    /// Root of the work tree
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Git directory of the work tree, outside the checked-out files
    pub fn git_dir(&self) -> &Path {
        self.repo.git_dir()
    }

    fn object_id(&self, name: &str, hex: &str) -> Result<gix::ObjectId> {
        gix::ObjectId::from_hex(hex.as_bytes()).map_err(|e| {
            GitError::ResolveFailed {
                name: name.to_string(),
                reason: format!("'{}' is not an object id: {}", hex, e),
            }
            .into()
        })
    }

    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.work_dir);
        cmd.arg("-c").arg("advice.detachedHead=false");
        cmd
    }
}

impl RepositoryBackend for GixRepository {
    fn current_branch(&self) -> Result<Option<String>> {
        let head_name = self
            .repo
            .head_name()
            .map_err(|e| GitError::ResolveFailed {
                name: "HEAD".to_string(),
                reason: e.to_string(),
            })?;

        Ok(head_name.and_then(|name| {
            name.as_bstr()
                .to_string()
                .strip_prefix(BRANCH_REF_PREFIX)
                .map(str::to_string)
        }))
    }

    fn head_commit(&self) -> Result<String> {
        let id = self.repo.head_id().map_err(|e| GitError::ResolveFailed {
            name: "HEAD".to_string(),
            reason: e.to_string(),
        })?;
        Ok(id.detach().to_string())
    }

    fn tag_names(&self) -> Result<Vec<String>> {
        let tag_error = |reason: String| GitError::TagOperationFailed {
            tag: "*".to_string(),
            reason,
        };

        let platform = self
            .repo
            .references()
            .map_err(|e| tag_error(e.to_string()))?;
        let tags = platform.tags().map_err(|e| tag_error(e.to_string()))?;

        let mut names = Vec::new();
        for reference in tags {
            let reference = reference.map_err(|e| tag_error(e.to_string()))?;
            names.push(reference.name().shorten().to_string());
        }
        Ok(names)
    }

    fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        let branch_error = |reason: String| GitError::BranchOperationFailed {
            branch: branch_name.to_string(),
            reason,
        };

        let platform = self
            .repo
            .references()
            .map_err(|e| branch_error(e.to_string()))?;
        let branches = platform
            .local_branches()
            .map_err(|e| branch_error(e.to_string()))?;

        for reference in branches {
            let reference = reference.map_err(|e| branch_error(e.to_string()))?;
            if reference.name().shorten() == branch_name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn create_branch(&self, branch_name: &str, target: &str) -> Result<()> {
        let id = self.object_id(branch_name, target)?;
        let full_name = format!("{}{}", BRANCH_REF_PREFIX, branch_name);

        self.repo
            .reference(
                full_name.as_str(),
                id,
                PreviousValue::MustNotExist,
                format!("branch: Created from {}", id),
            )
            .map_err(|e| GitError::BranchOperationFailed {
                branch: branch_name.to_string(),
                reason: e.to_string(),
            })?;

        log::debug!("Created {} at {}", full_name, id);
        Ok(())
    }

    fn delete_branch(&self, branch_name: &str) -> Result<()> {
        if self.current_branch()?.as_deref() == Some(branch_name) {
            return Err(GitError::BranchOperationFailed {
                branch: branch_name.to_string(),
                reason: "the branch is currently checked out".to_string(),
            }
            .into());
        }

        let full_name = format!("{}{}", BRANCH_REF_PREFIX, branch_name);
        let reference = self
            .repo
            .find_reference(full_name.as_str())
            .map_err(|e| GitError::BranchOperationFailed {
                branch: branch_name.to_string(),
                reason: e.to_string(),
            })?;

        reference
            .delete()
            .map_err(|e| GitError::BranchOperationFailed {
                branch: branch_name.to_string(),
                reason: e.to_string(),
            })?;

        log::debug!("Deleted {}", full_name);
        Ok(())
    }

    fn create_lightweight_tag(&self, tag_name: &str, target: &str) -> Result<TagInfo> {
        let id = self.object_id(tag_name, target)?;
        let full_name = format!("{}{}", TAG_REF_PREFIX, tag_name);

        self.repo
            .reference(
                full_name.as_str(),
                id,
                PreviousValue::MustNotExist,
                format!("tag: {}", tag_name),
            )
            .map_err(|e| GitError::TagOperationFailed {
                tag: tag_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(TagInfo {
            name: tag_name.to_string(),
            message: None,
            target_commit: id.to_string(),
            is_annotated: false,
        })
    }

    fn create_annotated_tag(
        &self,
        tag_name: &str,
        target: &str,
        message: &str,
    ) -> Result<TagInfo> {
        let id = self.object_id(tag_name, target)?;
        let tag_error = |reason: String| GitError::TagOperationFailed {
            tag: tag_name.to_string(),
            reason,
        };

        let tagger = self
            .repo
            .committer()
            .transpose()
            .map_err(|e| tag_error(format!("invalid committer identity: {}", e)))?;
        if tagger.is_none() {
            log::warn!("No committer identity configured; tag {} has no tagger", tag_name);
        }

        self.repo
            .tag(
                tag_name,
                id,
                gix::object::Kind::Commit,
                tagger,
                message,
                PreviousValue::MustNotExist,
            )
            .map_err(|e| tag_error(e.to_string()))?;

        Ok(TagInfo {
            name: tag_name.to_string(),
            message: Some(message.to_string()),
            target_commit: id.to_string(),
            is_annotated: true,
        })
    }

    fn resolve_revision(&self, revision: &str) -> Result<String> {
        let id = self
            .repo
            .rev_parse_single(revision)
            .map_err(|e| GitError::ResolveFailed {
                name: revision.to_string(),
                reason: e.to_string(),
            })?;
        Ok(id.detach().to_string())
    }

    fn checkout_force_create(&self, branch_name: &str, target: &str) -> Result<()> {
        let output = self
            .git_cmd()
            .args(["checkout", "--force", "-B", branch_name, target])
            .output()
            .map_err(|e| GitError::CheckoutFailed {
                branch: branch_name.to_string(),
                reason: format!("failed to execute git: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CheckoutFailed {
                branch: branch_name.to_string(),
                reason: stderr.trim().to_string(),
            }
            .into());
        }

        log::debug!("Checked out {} at {}", branch_name, target);
        Ok(())
    }
}
