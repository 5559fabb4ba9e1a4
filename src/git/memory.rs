//! In-memory RepositoryBackend for exercising the release lifecycle without a
//! real repository.

use crate::error::{GitError, Result};
use crate::git::{RepositoryBackend, TagInfo};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

/// Backend operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    /// `create_branch`
    CreateBranch,
    /// `delete_branch`
    DeleteBranch,
    /// both tag constructors
    CreateTag,
    /// `resolve_revision`
    Resolve,
    /// `checkout_force_create`
    Checkout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Branch(String),
    Detached(String),
}

#[derive(Debug)]
struct Inner {
    head: Head,
    branches: BTreeMap<String, String>,
    tags: BTreeMap<String, TagInfo>,
    remote_refs: BTreeMap<String, String>,
    next_commit: u64,
    failing: HashSet<MemoryOp>,
}

/// Simulated repository holding branches, tags, remote-tracking refs and HEAD.
///
/// Commit ids are synthetic 40-digit hex strings.
#[derive(Debug)]
pub struct MemoryRepository {
    inner: RefCell<Inner>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new("develop")
    }
}

impl MemoryRepository {
    /// Repository with a single commit on `branch`, which is checked out
    pub fn new(branch: &str) -> Self {
        let root = synthetic_commit(1);
        let mut branches = BTreeMap::new();
        branches.insert(branch.to_string(), root);

        Self {
            inner: RefCell::new(Inner {
                head: Head::Branch(branch.to_string()),
                branches,
                tags: BTreeMap::new(),
                remote_refs: BTreeMap::new(),
                next_commit: 2,
                failing: HashSet::new(),
            }),
        }
    }

    /// Add a new commit on top of HEAD and return its id
    pub fn commit(&self) -> String {
        let mut inner = self.inner.borrow_mut();
        let id = synthetic_commit(inner.next_commit);
        inner.next_commit += 1;

        match inner.head.clone() {
            Head::Branch(name) => {
                inner.branches.insert(name, id.clone());
            }
            Head::Detached(_) => inner.head = Head::Detached(id.clone()),
        }
        id
    }

    /// Check out an existing branch
    ///
    /// # Panics
    ///
    /// Panics if the branch does not exist.
    pub fn checkout(&self, branch: &str) {
        let mut inner = self.inner.borrow_mut();
        assert!(
            inner.branches.contains_key(branch),
            "no such branch: {}",
            branch
        );
        inner.head = Head::Branch(branch.to_string());
    }

    /// Create a branch at HEAD and check it out
    pub fn checkout_new(&self, branch: &str) {
        let head = self.head();
        let mut inner = self.inner.borrow_mut();
        inner.branches.insert(branch.to_string(), head);
        inner.head = Head::Branch(branch.to_string());
    }

    /// Detach HEAD at its current commit
    pub fn detach(&self) {
        let head = self.head();
        self.inner.borrow_mut().head = Head::Detached(head);
    }

    /// Add a lightweight tag at HEAD
    pub fn add_tag(&self, name: &str) {
        let target = self.head();
        self.inner.borrow_mut().tags.insert(
            name.to_string(),
            TagInfo {
                name: name.to_string(),
                message: None,
                target_commit: target,
                is_annotated: false,
            },
        );
    }

    /// Set a remote-tracking ref such as `origin/main`
    pub fn set_remote_ref(&self, name: &str, target: &str) {
        self.inner
            .borrow_mut()
            .remote_refs
            .insert(name.to_string(), target.to_string());
    }

    /// Make every later call of `op` fail
    pub fn fail_on(&self, op: MemoryOp) {
        self.inner.borrow_mut().failing.insert(op);
    }

    /// Commit HEAD points at
    pub fn head(&self) -> String {
        let inner = self.inner.borrow();
        match &inner.head {
            Head::Branch(name) => inner.branches[name].clone(),
            Head::Detached(id) => id.clone(),
        }
    }

    /// Names of all local branches
    pub fn branches(&self) -> Vec<String> {
        self.inner.borrow().branches.keys().cloned().collect()
    }

    /// Commit a local branch points at
    pub fn branch_target(&self, branch: &str) -> Option<String> {
        self.inner.borrow().branches.get(branch).cloned()
    }

    /// Look up a tag
    pub fn tag(&self, name: &str) -> Option<TagInfo> {
        self.inner.borrow().tags.get(name).cloned()
    }

    fn check(&self, op: MemoryOp, name: &str) -> Result<()> {
        if !self.inner.borrow().failing.contains(&op) {
            return Ok(());
        }

        let reason = "simulated failure".to_string();
        let error = match op {
            MemoryOp::CreateBranch | MemoryOp::DeleteBranch => GitError::BranchOperationFailed {
                branch: name.to_string(),
                reason,
            },
            MemoryOp::CreateTag => GitError::TagOperationFailed {
                tag: name.to_string(),
                reason,
            },
            MemoryOp::Resolve => GitError::ResolveFailed {
                name: name.to_string(),
                reason,
            },
            MemoryOp::Checkout => GitError::CheckoutFailed {
                branch: name.to_string(),
                reason,
            },
        };
        Err(error.into())
    }

    fn insert_tag(&self, info: TagInfo) -> Result<TagInfo> {
        self.check(MemoryOp::CreateTag, &info.name)?;

        let mut inner = self.inner.borrow_mut();
        if inner.tags.contains_key(&info.name) {
            return Err(GitError::TagOperationFailed {
                tag: info.name,
                reason: "tag already exists".to_string(),
            }
            .into());
        }
        inner.tags.insert(info.name.clone(), info.clone());
        Ok(info)
    }
}

fn synthetic_commit(n: u64) -> String {
    format!("{:040x}", n)
}

impl RepositoryBackend for MemoryRepository {
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(match &self.inner.borrow().head {
            Head::Branch(name) => Some(name.clone()),
            Head::Detached(_) => None,
        })
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.head())
    }

    fn tag_names(&self) -> Result<Vec<String>> {
        Ok(self.inner.borrow().tags.keys().cloned().collect())
    }

    fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        Ok(self.inner.borrow().branches.contains_key(branch_name))
    }

    fn create_branch(&self, branch_name: &str, target: &str) -> Result<()> {
        self.check(MemoryOp::CreateBranch, branch_name)?;

        let mut inner = self.inner.borrow_mut();
        if inner.branches.contains_key(branch_name) {
            return Err(GitError::BranchOperationFailed {
                branch: branch_name.to_string(),
                reason: "branch already exists".to_string(),
            }
            .into());
        }
        inner
            .branches
            .insert(branch_name.to_string(), target.to_string());
        Ok(())
    }

    fn delete_branch(&self, branch_name: &str) -> Result<()> {
        self.check(MemoryOp::DeleteBranch, branch_name)?;

        let mut inner = self.inner.borrow_mut();
        if inner.head == Head::Branch(branch_name.to_string()) {
            return Err(GitError::BranchOperationFailed {
                branch: branch_name.to_string(),
                reason: "the branch is currently checked out".to_string(),
            }
            .into());
        }
        inner
            .branches
            .remove(branch_name)
            .map(|_| ())
            .ok_or_else(|| {
                GitError::BranchOperationFailed {
                    branch: branch_name.to_string(),
                    reason: "no such branch".to_string(),
                }
                .into()
            })
    }

    fn create_lightweight_tag(&self, tag_name: &str, target: &str) -> Result<TagInfo> {
        self.insert_tag(TagInfo {
            name: tag_name.to_string(),
            message: None,
            target_commit: target.to_string(),
            is_annotated: false,
        })
    }

    fn create_annotated_tag(
        &self,
        tag_name: &str,
        target: &str,
        message: &str,
    ) -> Result<TagInfo> {
        self.insert_tag(TagInfo {
            name: tag_name.to_string(),
            message: Some(message.to_string()),
            target_commit: target.to_string(),
            is_annotated: true,
        })
    }

    fn resolve_revision(&self, revision: &str) -> Result<String> {
        self.check(MemoryOp::Resolve, revision)?;

        let inner = self.inner.borrow();
        inner
            .remote_refs
            .get(revision)
            .or_else(|| inner.branches.get(revision))
            .or_else(|| inner.tags.get(revision).map(|tag| &tag.target_commit))
            .cloned()
            .ok_or_else(|| {
                GitError::ResolveFailed {
                    name: revision.to_string(),
                    reason: "unknown revision".to_string(),
                }
                .into()
            })
    }

    fn checkout_force_create(&self, branch_name: &str, target: &str) -> Result<()> {
        self.check(MemoryOp::Checkout, branch_name)?;

        let mut inner = self.inner.borrow_mut();
        inner
            .branches
            .insert(branch_name.to_string(), target.to_string());
        inner.head = Head::Branch(branch_name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_advance_the_checked_out_branch() {
        let repo = MemoryRepository::new("develop");
        let first = repo.head();
        let second = repo.commit();

        assert_ne!(first, second);
        assert_eq!(repo.branch_target("develop").unwrap(), second);
        assert_eq!(second.len(), 40);
    }

    #[test]
    fn checked_out_branch_cannot_be_deleted() {
        let repo = MemoryRepository::new("develop");
        assert!(repo.delete_branch("develop").is_err());
        assert!(repo.branch_exists("develop").unwrap());
    }

    #[test]
    fn duplicate_tags_are_refused() {
        let repo = MemoryRepository::new("develop");
        let head = repo.head();
        repo.create_lightweight_tag("v1.0.0", &head).unwrap();
        assert!(repo.create_annotated_tag("v1.0.0", &head, "again").is_err());
        assert!(repo.tag_exists("v1.0.0").unwrap());
    }

    #[test]
    fn injected_failures_surface_as_git_errors() {
        let repo = MemoryRepository::new("develop");
        repo.fail_on(MemoryOp::Resolve);
        repo.set_remote_ref("origin/main", &repo.head());
        assert!(repo.resolve_revision("origin/main").is_err());
    }

    #[test]
    fn detached_head_has_no_branch() {
        let repo = MemoryRepository::new("develop");
        repo.detach();
        assert_eq!(repo.current_branch().unwrap(), None);
    }
}
