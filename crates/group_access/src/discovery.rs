//! Lazy discovery of projects and group memberships.
//!
//! Both pipelines are explicit cursors: each `next()` pulls at most one
//! more record, fetching further pages (or the next group's listing) only
//! when the consumer asks for them. Remote listings can be large, so a
//! caller that stops after the first match must not pay for the rest.

use crate::adapter::{GroupMembership, Project};
use crate::client::GitlabApi;
use crate::error::Result;
use crate::filter::GroupProjectFilter;
use crate::types::{GroupRecord, ProjectRecord, UserRecord};

/// Discovers projects matching a combined group/project name filter.
///
/// Name matching is delegated to the remote search (substring semantics);
/// ordering is remote-defined.
pub struct ProjectDiscovery<'a> {
    api: &'a GitlabApi,
    filter: GroupProjectFilter,
}

impl<'a> ProjectDiscovery<'a> {
    pub fn new(api: &'a GitlabApi, filter: GroupProjectFilter) -> Self {
        Self { api, filter }
    }

    /// Start a fresh cursor over matching projects.
    pub fn iter(&self) -> ProjectIter<'a> {
        ProjectIter {
            api: self.api,
            project_filter: self.filter.project.clone(),
            groups: self.api.group_pages(&self.filter.group),
            current: None,
        }
    }
}

/// Cursor over discovered projects.
pub struct ProjectIter<'a> {
    api: &'a GitlabApi,
    project_filter: String,
    groups: Box<dyn Iterator<Item = Result<GroupRecord>> + 'a>,
    current: Option<Box<dyn Iterator<Item = Result<ProjectRecord>> + 'a>>,
}

impl<'a> Iterator for ProjectIter<'a> {
    type Item = Result<Project<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(projects) = self.current.as_mut() {
                match projects.next() {
                    Some(Ok(record)) => return Some(Ok(Project::new(self.api, record))),
                    Some(Err(err)) => return Some(Err(err)),
                    None => self.current = None,
                }
            }
            match self.groups.next()? {
                Ok(group) => {
                    tracing::debug!(group = %group.full_path, "listing projects");
                    self.current = Some(
                        self.api
                            .group_project_pages(group.id, &self.project_filter),
                    );
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Discovers the membership relation between matching groups and one
/// user.
///
/// The user must already be resolved; resolution failures abort before
/// any group iteration (no partial output).
pub struct MembershipDiscovery<'a> {
    api: &'a GitlabApi,
    group_filter: String,
    user: UserRecord,
}

impl<'a> MembershipDiscovery<'a> {
    pub fn new(api: &'a GitlabApi, group_filter: impl Into<String>, user: UserRecord) -> Self {
        Self {
            api,
            group_filter: group_filter.into(),
            user,
        }
    }

    /// Start a fresh cursor over memberships, one per matching group.
    pub fn iter(&self) -> MembershipIter<'a> {
        MembershipIter {
            api: self.api,
            user: self.user.clone(),
            groups: self.api.group_pages(&self.group_filter),
        }
    }
}

/// Cursor over group memberships. Each step performs one member lookup.
pub struct MembershipIter<'a> {
    api: &'a GitlabApi,
    user: UserRecord,
    groups: Box<dyn Iterator<Item = Result<GroupRecord>> + 'a>,
}

impl<'a> Iterator for MembershipIter<'a> {
    type Item = Result<GroupMembership<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.groups.next()? {
            Ok(group) => Some(GroupMembership::new(self.api, &group, &self.user)),
            Err(err) => Some(Err(err)),
        }
    }
}
