//! Pinned revision of the upstream repository.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// A commit plus a sub-revision counter.
///
/// The sub-revision is bumped whenever the build recipe changes while the
/// commit stays the same, so anything keyed on [`package_version`] is
/// invalidated.
///
/// [`package_version`]: TargetRevision::package_version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct TargetRevision {
    commit: String,
    sub_revision: u32,
}

impl TargetRevision {
    pub fn new(commit: impl Into<String>, sub_revision: u32) -> Self {
        Self {
            commit: commit.into(),
            sub_revision,
        }
    }

    /// The commit handed to `git checkout`.
    pub fn commit(&self) -> &str {
        &self.commit
    }

    pub fn sub_revision(&self) -> u32 {
        self.sub_revision
    }

    /// `<commit>-<sub_revision>`
    pub fn package_version(&self) -> String {
        format!("{}-{}", self.commit, self.sub_revision)
    }
}

impl fmt::Display for TargetRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.commit, self.sub_revision)
    }
}

/// Parses `<commit>` or `<commit>-<sub_revision>`. A bare commit has
/// sub-revision 0.
///
/// The commit must be a (possibly abbreviated) hexadecimal hash. Branch and
/// tag names are rejected, so `release-2024` is never split into a commit and
/// a sub-revision.
impl FromStr for TargetRevision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |message: &str| Error::InvalidRevision {
            value: s.to_string(),
            message: message.to_string(),
        };

        let (commit, sub_revision) = match s.rsplit_once('-') {
            Some((commit, sub)) => {
                let sub = sub
                    .parse::<u32>()
                    .map_err(|_| invalid("sub-revision must be a non-negative integer"))?;
                (commit, sub)
            }
            None => (s, 0),
        };

        if commit.is_empty() {
            return Err(invalid("commit must not be empty"));
        }
        if !commit.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("commit must be a hexadecimal hash"));
        }

        Ok(Self::new(commit, sub_revision))
    }
}

impl TryFrom<String> for TargetRevision {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
