//! Project listing by topic.

use std::io::Write;

use crate::adapter::Project;
use crate::client::GitlabApi;
use crate::discovery::ProjectDiscovery;
use crate::error::Result;
use crate::filter::{topics_match, GroupProjectFilter};

/// Lists projects matching a group/project filter and, optionally, at
/// least one of a set of topics. Read-only.
pub struct ProjectManager<'a> {
    api: &'a GitlabApi,
    filter: GroupProjectFilter,
    topics: Vec<String>,
}

impl<'a> ProjectManager<'a> {
    /// An empty `topics` list disables topic filtering.
    pub fn new(api: &'a GitlabApi, filter: GroupProjectFilter, topics: Vec<String>) -> Self {
        Self {
            api,
            filter,
            topics,
        }
    }

    /// Lazy sequence of matching projects.
    pub fn projects(&self) -> impl Iterator<Item = Result<Project<'a>>> + '_ {
        ProjectDiscovery::new(self.api, self.filter.clone())
            .iter()
            .filter(move |item| match item {
                Ok(project) => topics_match(project.topics(), &self.topics),
                Err(_) => true,
            })
    }

    /// Display all matching projects as a YAML-style list.
    pub fn show(&self, out: &mut dyn Write) -> Result<()> {
        for project in self.projects() {
            writeln!(out, "- {}", project?)?;
        }
        Ok(())
    }
}
