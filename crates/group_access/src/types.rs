//! API data types.
//!
//! Minimal record structs covering the fields this tool reads; the API
//! returns far more, which serde ignores.

use std::fmt;
use std::str::FromStr;

use gitlab::api::common::AccessLevel;
use serde::Deserialize;
use thiserror::Error;

/// A GitLab group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    /// Group ID.
    pub id: u64,
    /// Group name.
    pub name: String,
    /// Full path (e.g., "parent/child").
    pub full_path: String,
}

/// A GitLab project as returned by a group's project listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    /// Project ID.
    pub id: u64,
    /// Fully qualified name including the namespace (e.g., "group/project").
    pub path_with_namespace: String,
    /// Project topics. Older instances call this `tag_list`.
    #[serde(default, alias = "tag_list")]
    pub topics: Vec<String>,
}

/// A GitLab user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// User ID.
    pub id: u64,
    /// Username.
    pub username: String,
    /// Display name.
    pub name: Option<String>,
}

/// A direct member of a group.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    /// User ID of the member.
    pub id: u64,
    /// Username of the member.
    pub username: String,
    /// Numeric access level (10 = guest .. 50 = owner).
    pub access_level: u64,
}

/// A merge request as returned by a project's merge request listing.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestRecord {
    /// Project-relative IID.
    pub iid: u64,
    /// ID of the project the merge request belongs to.
    pub project_id: u64,
    /// Title.
    pub title: String,
    /// Reference strings.
    pub references: MergeRequestRefs,
    /// Mergeability as reported by the server.
    #[serde(default)]
    pub merge_status: MergeStatus,
    /// Labels attached to the merge request.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Reference strings of a merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestRefs {
    /// Globally unique reference (e.g., "group/project!42").
    pub full: String,
}

/// Mergeability of a merge request.
///
/// `Unknown` covers the server's transient `unchecked`/`checking` answers;
/// only `CanBeMerged` permits a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    CanBeMerged,
    CannotBeMerged,
    #[serde(other)]
    #[default]
    Unknown,
}

/// A CI pipeline attached to a merge request.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRecord {
    /// Pipeline ID.
    pub id: u64,
    /// Terminal or current status.
    pub status: PipelineStatus,
}

/// Status of a pipeline run. Anything but `Success` blocks automatic
/// merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    #[serde(other)]
    Unknown,
}

/// One rung of the ordered permission scale.
///
/// `None` is a valid *target* on the scale, meaning "no access" (revoke);
/// membership records never carry it — see [`MemberState`]. The ordering
/// is for display and comparison only; updates are exact-match writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    None,
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
}

impl Permission {
    /// The access level to write for this rung; `None` has no level (it
    /// is realized by deleting the membership).
    pub fn as_access_level(self) -> Option<AccessLevel> {
        match self {
            Self::None => None,
            Self::Guest => Some(AccessLevel::Guest),
            Self::Reporter => Some(AccessLevel::Reporter),
            Self::Developer => Some(AccessLevel::Developer),
            Self::Maintainer => Some(AccessLevel::Maintainer),
            Self::Owner => Some(AccessLevel::Owner),
        }
    }

    /// Map a numeric access level onto the scale, rounding down to the
    /// nearest named rung (GitLab has intermediate levels, e.g. minimal
    /// access = 5, which this tool never writes).
    pub fn from_access_level(level: u64) -> Self {
        match level {
            l if l >= AccessLevel::Owner.as_u64() => Self::Owner,
            l if l >= AccessLevel::Maintainer.as_u64() => Self::Maintainer,
            l if l >= AccessLevel::Developer.as_u64() => Self::Developer,
            l if l >= AccessLevel::Reporter.as_u64() => Self::Reporter,
            l if l >= AccessLevel::Guest.as_u64() => Self::Guest,
            _ => Self::None,
        }
    }

    /// Lowercase name as used on the command line and in output.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Guest => "guest",
            Self::Reporter => "reporter",
            Self::Developer => "developer",
            Self::Maintainer => "maintainer",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a permission name.
#[derive(Debug, Error)]
#[error("unknown permission '{0}'; expected one of none, guest, reporter, developer, maintainer, owner")]
pub struct ParsePermissionError(String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "guest" => Ok(Self::Guest),
            "reporter" => Ok(Self::Reporter),
            "developer" => Ok(Self::Developer),
            "maintainer" => Ok(Self::Maintainer),
            "owner" => Ok(Self::Owner),
            other => Err(ParsePermissionError(other.to_string())),
        }
    }
}

/// Membership state of a user in a group.
///
/// A tagged variant instead of a sentinel level: an access level exists
/// only when there is a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    NotAMember,
    Member(Permission),
}

impl MemberState {
    /// Whether a membership exists.
    pub fn is_member(self) -> bool {
        matches!(self, Self::Member(_))
    }
}
