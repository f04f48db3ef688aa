//! GitLab API client wrapper.
//!
//! Owns the synchronous client handle and builds every REST endpoint used
//! by the managers. All calls block; the tool is strictly sequential, so
//! one handle serves the whole invocation.

use gitlab::api::common::AccessLevel;
use gitlab::api::groups::members::{
    AddGroupMember, EditGroupMember, GroupMember, RemoveGroupMember,
};
use gitlab::api::groups::projects::GroupProjects;
use gitlab::api::groups::Groups;
use gitlab::api::projects::merge_requests::pipelines::MergeRequestPipelines;
use gitlab::api::projects::merge_requests::{
    MergeMergeRequest, MergeRequestState, MergeRequests,
};
use gitlab::api::projects::EditProject;
use gitlab::api::users::Users;
use gitlab::api::{self, Pagination, Query};
use gitlab::{Gitlab, GitlabBuilder};

use crate::error::{is_not_found, Error, Result};
use crate::types::{
    GroupRecord, MemberRecord, MergeRequestRecord, PipelineRecord, ProjectRecord, UserRecord,
};

/// Connection to one GitLab instance.
pub struct GitlabApi {
    client: Gitlab,
    url: String,
}

impl GitlabApi {
    /// Connect to a GitLab instance.
    ///
    /// The client builder expects a bare hostname, so any URL scheme is
    /// stripped; an `http://` prefix switches the client to plain HTTP.
    /// Access is anonymous when no token is supplied. `insecure` disables
    /// TLS certificate verification.
    pub fn connect(uri: &str, token: Option<&str>, insecure: bool) -> Result<Self> {
        let host = uri
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        let scheme = if uri.starts_with("http://") { "http" } else { "https" };

        let mut builder = match token {
            Some(token) if !token.is_empty() => GitlabBuilder::new(host, token),
            _ => GitlabBuilder::new_unauthenticated(host),
        };
        if scheme == "http" {
            builder.insecure();
        }
        if insecure {
            tracing::warn!("TLS certificate verification is disabled");
            builder.cert_insecure();
        }
        let client = builder.build()?;

        tracing::debug!(host = %host, "connected");
        Ok(Self {
            client,
            url: format!("{scheme}://{host}"),
        })
    }

    /// The URL this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lazily paged listing of groups whose name matches `search`.
    ///
    /// Pages are fetched as the returned iterator is advanced; dropping it
    /// early leaves the remaining pages unfetched.
    pub(crate) fn group_pages<'a>(
        &'a self,
        search: &str,
    ) -> Box<dyn Iterator<Item = Result<GroupRecord>> + 'a> {
        let endpoint = match Groups::builder().search(search.to_owned()).build() {
            Ok(endpoint) => endpoint,
            Err(err) => return Box::new(std::iter::once(Err(Error::endpoint(err)))),
        };
        Box::new(
            api::paged(endpoint, Pagination::All)
                .into_iter(&self.client)
                .map(|item| item.map_err(Error::from)),
        )
    }

    /// Lazily paged listing of one group's projects matching `search`.
    pub(crate) fn group_project_pages<'a>(
        &'a self,
        group: u64,
        search: &str,
    ) -> Box<dyn Iterator<Item = Result<ProjectRecord>> + 'a> {
        let endpoint = match GroupProjects::builder()
            .group(group)
            .search(search.to_owned())
            .build()
        {
            Ok(endpoint) => endpoint,
            Err(err) => return Box::new(std::iter::once(Err(Error::endpoint(err)))),
        };
        Box::new(
            api::paged(endpoint, Pagination::All)
                .into_iter(&self.client)
                .map(|item| item.map_err(Error::from)),
        )
    }

    /// Resolve a username to exactly one account.
    ///
    /// Fails with [`Error::Resolution`] on zero or multiple matches,
    /// before any iteration begins.
    pub fn resolve_user(&self, username: &str) -> Result<UserRecord> {
        let endpoint = Users::builder()
            .username(username)
            .build()
            .map_err(|err| Error::endpoint(err))?;
        let users: Vec<UserRecord> = api::paged(endpoint, Pagination::All).query(&self.client)?;

        match users.as_slice() {
            [user] => Ok(user.clone()),
            _ => Err(Error::Resolution {
                username: username.to_string(),
            }),
        }
    }

    /// Replace a project's topic list. An empty slice clears it.
    pub(crate) fn set_project_topics(&self, project: u64, topics: &[String]) -> Result<()> {
        let endpoint = EditProject::builder()
            .project(project)
            .topics(topics.iter().map(String::as_str))
            .build()
            .map_err(|err| Error::endpoint(err))?;
        api::ignore(endpoint).query(&self.client)?;
        Ok(())
    }

    /// List a project's open merge requests, optionally restricted to the
    /// given labels (a server-side filter; no local re-filtering).
    pub(crate) fn open_merge_requests(
        &self,
        project: u64,
        labels: &[String],
    ) -> Result<Vec<MergeRequestRecord>> {
        let mut builder = MergeRequests::builder();
        builder.project(project).state(MergeRequestState::Opened);
        if !labels.is_empty() {
            builder.labels(labels.iter().map(String::as_str));
        }
        let endpoint = builder.build().map_err(|err| Error::endpoint(err))?;

        let merge_requests = api::paged(endpoint, Pagination::All).query(&self.client)?;
        Ok(merge_requests)
    }

    /// List the pipelines attached to a merge request.
    pub(crate) fn merge_request_pipelines(
        &self,
        project: u64,
        merge_request: u64,
    ) -> Result<Vec<PipelineRecord>> {
        let endpoint = MergeRequestPipelines::builder()
            .project(project)
            .merge_request(merge_request)
            .build()
            .map_err(|err| Error::endpoint(err))?;

        let pipelines = api::paged(endpoint, Pagination::All).query(&self.client)?;
        Ok(pipelines)
    }

    /// Merge a merge request.
    pub(crate) fn merge_merge_request(&self, project: u64, merge_request: u64) -> Result<()> {
        let endpoint = MergeMergeRequest::builder()
            .project(project)
            .merge_request(merge_request)
            .build()
            .map_err(|err| Error::endpoint(err))?;
        api::ignore(endpoint).query(&self.client)?;
        Ok(())
    }

    /// Look up a user's direct membership of a group.
    ///
    /// A 404 means the user is not a member; inherited memberships are not
    /// visible through this endpoint.
    pub(crate) fn group_member(&self, group: u64, user: u64) -> Result<Option<MemberRecord>> {
        let endpoint = GroupMember::builder()
            .group(group)
            .user(user)
            .build()
            .map_err(|err| Error::endpoint(err))?;

        match endpoint.query(&self.client) {
            Ok(member) => Ok(Some(member)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Add a user to a group at the given access level.
    pub(crate) fn add_group_member(
        &self,
        group: u64,
        user: u64,
        access_level: AccessLevel,
    ) -> Result<()> {
        let endpoint = AddGroupMember::builder()
            .group(group)
            .user(user)
            .access_level(access_level)
            .build()
            .map_err(|err| Error::endpoint(err))?;
        api::ignore(endpoint).query(&self.client)?;
        Ok(())
    }

    /// Change the access level of an existing group member.
    pub(crate) fn edit_group_member(
        &self,
        group: u64,
        user: u64,
        access_level: AccessLevel,
    ) -> Result<()> {
        let endpoint = EditGroupMember::builder()
            .group(group)
            .user(user)
            .access_level(access_level)
            .build()
            .map_err(|err| Error::endpoint(err))?;
        api::ignore(endpoint).query(&self.client)?;
        Ok(())
    }

    /// Remove a user from a group.
    pub(crate) fn remove_group_member(&self, group: u64, user: u64) -> Result<()> {
        let endpoint = RemoveGroupMember::builder()
            .group(group)
            .user(user)
            .build()
            .map_err(|err| Error::endpoint(err))?;
        api::ignore(endpoint).query(&self.client)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_is_send() {
        // Compile-time check: the handle can move across thread boundaries
        // even though this tool never does.
        fn assert_send<T: Send>() {}
        assert_send::<GitlabApi>();
    }
}
