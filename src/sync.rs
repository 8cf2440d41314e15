//! # Repository Synchronization
//!
//! [`RepoSynchronizer`] makes sure the working copy at a given path is checked
//! out at the pinned revision, or fails.
//!
//! An existing directory is reused when it has no local modifications and the
//! pinned commit can be fetched and checked out in place. Anything else (a
//! dirty tree, a failed fetch, a failed checkout) gets the whole directory
//! deleted and cloned again. There is no attempt to repair a tree: the
//! synchronizer cannot tell why a tree diverged, and a bit-exact checkout is
//! worth more than the cost of a fresh clone.
//!
//! Git is always pointed at the working copy with `-C`, so the process working
//! directory is never changed.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::process::{CommandRunner, Invocation};
use crate::revision::TargetRevision;

const GIT: &str = "git";

/// Clones or updates one remote repository.
pub struct RepoSynchronizer<'a> {
    runner: &'a dyn CommandRunner,
    remote_url: String,
}

impl<'a> RepoSynchronizer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, remote_url: impl Into<String>) -> Self {
        Self {
            runner,
            remote_url: remote_url.into(),
        }
    }

    /// Checks out `revision` into `dir`. Any local modifications in `dir` are
    /// lost.
    ///
    /// On success `dir` holds a clean working copy at the revision's commit.
    /// Returns [`Error::Synchronization`] if a fresh clone or the checkout
    /// that follows it fails.
    pub fn synchronize(&self, revision: &TargetRevision, dir: &Path) -> Result<()> {
        info!(
            "Checking out {} at {} into {}",
            self.remote_url,
            revision,
            dir.display()
        );

        if dir.is_dir() {
            if self.update_in_place(revision, dir)? {
                return Ok(());
            }
            info!("Removing {}", dir.display());
            fs::remove_dir_all(dir).map_err(|e| self.discard_failure(revision, dir, e))?;
        } else if dir.exists() {
            warn!("{} exists but is not a directory, removing it", dir.display());
            fs::remove_file(dir).map_err(|e| self.discard_failure(revision, dir, e))?;
        }

        self.clone_fresh(revision, dir)
    }

    /// Returns `Ok(false)` when the existing tree cannot be used as is.
    fn update_in_place(&self, revision: &TargetRevision, dir: &Path) -> Result<bool> {
        // Without its own .git, `git -C` would walk up and act on whatever
        // repository encloses `dir`.
        if !dir.join(".git").exists() {
            warn!("{} is not a git checkout, discarding it", dir.display());
            return Ok(false);
        }
        // diff-index --quiet succeeds only when there is no diff against HEAD.
        if !self.runner.succeeds(&git_in(dir).args(["diff-index", "--quiet", "HEAD"]))? {
            warn!("{} has local modifications, discarding it", dir.display());
            return Ok(false);
        }
        if !self.runner.succeeds(&git_in(dir).arg("fetch"))? {
            warn!("Fetching into {} failed, discarding it", dir.display());
            return Ok(false);
        }
        if !self.runner.succeeds(&checkout(dir, revision))? {
            warn!(
                "Checking out {} in {} failed, discarding it",
                revision.commit(),
                dir.display()
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn clone_fresh(&self, revision: &TargetRevision, dir: &Path) -> Result<()> {
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)?;
        }

        let clone = Invocation::new(GIT)
            .arg("clone")
            .arg(&self.remote_url)
            .arg(dir);
        if !self.runner.succeeds(&clone)? {
            // A half-written clone must never be mistaken for a usable tree.
            if dir.exists() {
                if let Err(e) = fs::remove_dir_all(dir) {
                    warn!("Could not remove partial clone {}: {}", dir.display(), e);
                }
            }
            return Err(self.failure(
                revision,
                dir,
                format!("git clone of {} failed", self.remote_url),
            ));
        }

        if !self.runner.succeeds(&checkout(dir, revision))? {
            return Err(self.failure(
                revision,
                dir,
                format!("git checkout {} failed after clone", revision.commit()),
            ));
        }

        Ok(())
    }

    fn discard_failure(&self, revision: &TargetRevision, dir: &Path, e: std::io::Error) -> Error {
        self.failure(
            revision,
            dir,
            format!("could not discard existing tree: {}", e),
        )
    }

    fn failure(&self, revision: &TargetRevision, dir: &Path, message: String) -> Error {
        Error::Synchronization {
            revision: revision.to_string(),
            path: dir.to_path_buf(),
            message,
        }
    }
}

fn git_in(dir: &Path) -> Invocation {
    Invocation::new(GIT).arg("-C").arg(dir)
}

fn checkout(dir: &Path, revision: &TargetRevision) -> Invocation {
    git_in(dir).arg("checkout").arg(revision.commit())
}
