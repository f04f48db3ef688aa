//! Adapters wrapping raw remote records.
//!
//! Each adapter normalizes the fields the managers read and carries the
//! mutation operations for its resource. Local state changes only after
//! the corresponding remote call succeeded, so reads within the same
//! invocation reflect the update.

use std::fmt;
use std::io::Write;

use crate::client::GitlabApi;
use crate::error::{Error, Result};
use crate::types::{
    GroupRecord, MemberState, MergeRequestRecord, MergeStatus, Permission, PipelineStatus,
    ProjectRecord, UserRecord,
};

/// A project, identified by id and fully qualified name.
pub struct Project<'a> {
    api: &'a GitlabApi,
    id: u64,
    name: String,
    topics: Vec<String>,
}

impl<'a> Project<'a> {
    pub(crate) fn new(api: &'a GitlabApi, record: ProjectRecord) -> Self {
        Self {
            api,
            id: record.id,
            name: record.path_with_namespace,
            topics: record.topics,
        }
    }

    /// Numeric project ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fully qualified name (`group-path/project-name`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Topics, in the order the server reports them.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Print the project name and its topics.
    pub fn show_topics(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", topics_line(&self.name, &self.topics))?;
        Ok(())
    }

    /// Replace the entire topic list with `new_topics`, verbatim.
    ///
    /// Prints a before/after line first, then updates the remote project;
    /// the adapter mutates only after the update succeeded.
    pub fn set_topics(&mut self, new_topics: &[String], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", topic_change_line(&self.name, &self.topics, new_topics))?;
        self.api.set_project_topics(self.id, new_topics)?;
        self.topics = new_topics.to_vec();
        Ok(())
    }
}

impl fmt::Display for Project<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn all_pipelines_succeeded(statuses: &[PipelineStatus]) -> bool {
    statuses
        .iter()
        .all(|status| *status == PipelineStatus::Success)
}

fn topics_line(name: &str, topics: &[String]) -> String {
    if topics.is_empty() {
        name.to_string()
    } else {
        format!("{} topics in {}: {}", topics.len(), name, topics.join(", "))
    }
}

fn topic_change_line(name: &str, old: &[String], new: &[String]) -> String {
    if old.is_empty() {
        format!("Setting new topics on {name}: {new:?}")
    } else {
        format!("Replacing topics on {name}: {old:?} -> {new:?}")
    }
}

/// An open merge request of a discovered project.
pub struct MergeRequest<'a> {
    api: &'a GitlabApi,
    project_id: u64,
    iid: u64,
    title: String,
    reference: String,
    status: MergeStatus,
}

impl<'a> MergeRequest<'a> {
    pub(crate) fn new(api: &'a GitlabApi, record: MergeRequestRecord) -> Self {
        Self {
            api,
            project_id: record.project_id,
            iid: record.iid,
            title: record.title,
            reference: record.references.full,
            status: record.merge_status,
        }
    }

    /// Globally unique reference (`group/project!iid`).
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Mergeability as reported at listing time.
    pub fn merge_status(&self) -> MergeStatus {
        self.status
    }

    pub fn is_mergeable(&self) -> bool {
        self.status == MergeStatus::CanBeMerged
    }

    /// Whether every attached pipeline succeeded; vacuously true without
    /// pipelines. One remote call per invocation.
    pub fn pipelines_succeeded(&self) -> Result<bool> {
        let pipelines = self.api.merge_request_pipelines(self.project_id, self.iid)?;
        let statuses: Vec<PipelineStatus> =
            pipelines.iter().map(|pipeline| pipeline.status).collect();
        Ok(all_pipelines_succeeded(&statuses))
    }

    /// Merge this merge request.
    pub fn merge(&self) -> Result<()> {
        tracing::debug!(reference = %self.reference, "merging");
        self.api.merge_merge_request(self.project_id, self.iid)
    }
}

/// The membership relation between one group and one user.
pub struct GroupMembership<'a> {
    api: &'a GitlabApi,
    group_id: u64,
    group_path: String,
    user_id: u64,
    username: String,
    state: MemberState,
}

impl<'a> GroupMembership<'a> {
    /// Look up the user's direct membership of `group`.
    pub(crate) fn new(api: &'a GitlabApi, group: &GroupRecord, user: &UserRecord) -> Result<Self> {
        let state = match api.group_member(group.id, user.id)? {
            Some(member) => MemberState::Member(Permission::from_access_level(member.access_level)),
            None => MemberState::NotAMember,
        };

        Ok(Self {
            api,
            group_id: group.id,
            group_path: group.full_path.clone(),
            user_id: user.id,
            username: user.username.clone(),
            state,
        })
    }

    /// Full path of the group.
    pub fn group_path(&self) -> &str {
        &self.group_path
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> MemberState {
        self.state
    }

    pub fn is_member(&self) -> bool {
        self.state.is_member()
    }

    /// Bring the membership to the requested level.
    ///
    /// Exact-match semantics: the same level is a no-op, a different level
    /// is updated in place, `none` removes the membership, and a missing
    /// membership is created. An action line precedes each mutation.
    pub fn set_membership(&mut self, target: Permission, out: &mut dyn Write) -> Result<()> {
        match membership_action(self.state, target) {
            None => Ok(()),
            Some(MembershipAction::Revoke) => {
                writeln!(
                    out,
                    "Removing {} from group {}",
                    self.username, self.group_path
                )?;
                self.api.remove_group_member(self.group_id, self.user_id)?;
                self.state = MemberState::NotAMember;
                Ok(())
            }
            Some(MembershipAction::Update(level)) => {
                writeln!(
                    out,
                    "Updating access level of {} in group {} to '{}'",
                    self.username, self.group_path, level
                )?;
                let access_level = access_level_for(level)?;
                self.api
                    .edit_group_member(self.group_id, self.user_id, access_level)?;
                self.state = MemberState::Member(level);
                Ok(())
            }
            Some(MembershipAction::Grant(level)) => {
                writeln!(
                    out,
                    "Adding {} to group {} as '{}'",
                    self.username, self.group_path, level
                )?;
                let access_level = access_level_for(level)?;
                self.api
                    .add_group_member(self.group_id, self.user_id, access_level)?;
                self.state = MemberState::Member(level);
                Ok(())
            }
        }
    }
}

impl fmt::Display for GroupMembership<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&membership_line(&self.group_path, &self.username, self.state))
    }
}

fn membership_line(group_path: &str, username: &str, state: MemberState) -> String {
    match state {
        MemberState::Member(level) => {
            format!("Group {group_path}: {username} has access level '{level}'")
        }
        MemberState::NotAMember => {
            format!("Group {group_path}: {username} is not a member.")
        }
    }
}

/// The mutation needed to reach `target` from `state`; `None` when the
/// membership is already in the requested state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MembershipAction {
    Grant(Permission),
    Update(Permission),
    Revoke,
}

fn membership_action(state: MemberState, target: Permission) -> Option<MembershipAction> {
    match (state, target) {
        (MemberState::Member(current), target) if current == target => None,
        (MemberState::Member(_), Permission::None) => Some(MembershipAction::Revoke),
        (MemberState::Member(_), target) => Some(MembershipAction::Update(target)),
        (MemberState::NotAMember, Permission::None) => None,
        (MemberState::NotAMember, target) => Some(MembershipAction::Grant(target)),
    }
}

fn access_level_for(level: Permission) -> Result<gitlab::api::common::AccessLevel> {
    level
        .as_access_level()
        .ok_or_else(|| Error::Unexpected(format!("'{level}' has no writable access level")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_all_pipelines_succeeded() {
        use PipelineStatus::{Failed, Success};

        assert!(all_pipelines_succeeded(&[Success, Success]));
        assert!(!all_pipelines_succeeded(&[Success, Failed]));
        // Vacuously true without pipelines.
        assert!(all_pipelines_succeeded(&[]));
    }

    #[test]
    fn test_topics_line_without_topics_is_bare_name() {
        assert_eq!(topics_line("foo/bar-svc", &[]), "foo/bar-svc");
    }

    #[test]
    fn test_topics_line_with_topics() {
        assert_eq!(
            topics_line("foo/bar", &strings(&["rust", "cli"])),
            "2 topics in foo/bar: rust, cli"
        );
    }

    #[test]
    fn test_topic_change_line_fresh() {
        assert_eq!(
            topic_change_line("foo/bar", &[], &strings(&["a"])),
            r#"Setting new topics on foo/bar: ["a"]"#
        );
    }

    #[test]
    fn test_topic_change_line_replacement() {
        assert_eq!(
            topic_change_line("foo/bar", &strings(&["a"]), &strings(&["b", "c"])),
            r#"Replacing topics on foo/bar: ["a"] -> ["b", "c"]"#
        );
    }

    #[test]
    fn test_membership_line_member() {
        assert_eq!(
            membership_line("foo", "alice", MemberState::Member(Permission::Maintainer)),
            "Group foo: alice has access level 'maintainer'"
        );
    }

    #[test]
    fn test_membership_line_non_member() {
        assert_eq!(
            membership_line("foo", "alice", MemberState::NotAMember),
            "Group foo: alice is not a member."
        );
    }

    #[test]
    fn test_membership_action_same_level_is_noop() {
        let state = MemberState::Member(Permission::Maintainer);
        assert_eq!(membership_action(state, Permission::Maintainer), None);
    }

    #[test]
    fn test_membership_action_none_revokes_member() {
        let state = MemberState::Member(Permission::Maintainer);
        assert_eq!(
            membership_action(state, Permission::None),
            Some(MembershipAction::Revoke)
        );
    }

    #[test]
    fn test_membership_action_different_level_updates() {
        let state = MemberState::Member(Permission::Developer);
        assert_eq!(
            membership_action(state, Permission::Owner),
            Some(MembershipAction::Update(Permission::Owner))
        );
    }

    #[test]
    fn test_membership_action_grants_non_member() {
        assert_eq!(
            membership_action(MemberState::NotAMember, Permission::Reporter),
            Some(MembershipAction::Grant(Permission::Reporter))
        );
    }

    #[test]
    fn test_membership_action_none_on_non_member_is_noop() {
        assert_eq!(membership_action(MemberState::NotAMember, Permission::None), None);
    }

    #[test]
    fn test_access_level_for_none_is_an_error() {
        assert!(access_level_for(Permission::None).is_err());
        assert!(access_level_for(Permission::Guest).is_ok());
    }
}
