//! Group membership management for one user.

use std::io::Write;

use crate::adapter::GroupMembership;
use crate::client::GitlabApi;
use crate::discovery::MembershipDiscovery;
use crate::error::Result;
use crate::types::{Permission, UserRecord};

/// Manages one user's access to groups matching a name filter.
///
/// The username is resolved once, at construction; zero or multiple
/// matches fail before any group is touched.
pub struct GroupManager<'a> {
    api: &'a GitlabApi,
    group_filter: String,
    user: UserRecord,
    is_member: bool,
}

impl<'a> GroupManager<'a> {
    /// `is_member` restricts the sequence to current members (`true`) or
    /// to non-members (`false`).
    pub fn new(
        api: &'a GitlabApi,
        group_filter: impl Into<String>,
        username: &str,
        is_member: bool,
    ) -> Result<Self> {
        let user = api.resolve_user(username)?;
        tracing::debug!(username = %user.username, id = user.id, "resolved user");

        Ok(Self {
            api,
            group_filter: group_filter.into(),
            user,
            is_member,
        })
    }

    /// Lazy sequence of memberships in matching groups, restricted to the
    /// configured membership state.
    pub fn groups(&self) -> impl Iterator<Item = Result<GroupMembership<'a>>> + 'a {
        let want_member = self.is_member;
        MembershipDiscovery::new(self.api, self.group_filter.clone(), self.user.clone())
            .iter()
            .filter(move |item| match item {
                Ok(membership) => membership.is_member() == want_member,
                Err(_) => true,
            })
    }

    /// Display each matching group with the user's access level.
    pub fn show(&self, out: &mut dyn Write) -> Result<()> {
        for membership in self.groups() {
            writeln!(out, "{}", membership?)?;
        }
        Ok(())
    }

    /// Bring the user's access to every matching group to the requested
    /// level. `none` revokes membership.
    pub fn set(&self, permission: Permission, out: &mut dyn Write) -> Result<()> {
        for membership in self.groups() {
            membership?.set_membership(permission, out)?;
        }
        Ok(())
    }
}
