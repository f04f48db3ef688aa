//! Topic management on discovered projects.

use std::io::Write;

use crate::adapter::Project;
use crate::client::GitlabApi;
use crate::discovery::ProjectDiscovery;
use crate::error::Result;
use crate::filter::{topic_state_matches, GroupProjectFilter};

/// Manages topics on projects matching a group/project filter, restricted
/// by topic state (empty or non-empty topic list).
pub struct TopicManager<'a> {
    api: &'a GitlabApi,
    filter: GroupProjectFilter,
    empty: bool,
}

impl<'a> TopicManager<'a> {
    /// `empty` selects projects with an empty topic list; `false` selects
    /// projects that already have topics.
    pub fn new(api: &'a GitlabApi, filter: GroupProjectFilter, empty: bool) -> Self {
        Self { api, filter, empty }
    }

    /// Lazy sequence of matching projects, post topic-state filter.
    pub fn projects(&self) -> impl Iterator<Item = Result<Project<'a>>> + 'a {
        let empty = self.empty;
        ProjectDiscovery::new(self.api, self.filter.clone())
            .iter()
            .filter(move |item| match item {
                Ok(project) => topic_state_matches(project.topic_count(), empty),
                Err(_) => true,
            })
    }

    /// Display all matching projects and their topics.
    pub fn show(&self, out: &mut dyn Write) -> Result<()> {
        for project in self.projects() {
            project?.show_topics(out)?;
        }
        Ok(())
    }

    /// Replace the topic list on every matching project.
    ///
    /// A single empty string means "clear": the replacement becomes the
    /// empty list. A failed update aborts the remaining projects; earlier
    /// updates stay applied.
    pub fn set(&self, new_topics: &[String], out: &mut dyn Write) -> Result<()> {
        let replacement = normalize_topics(new_topics);
        for project in self.projects() {
            project?.set_topics(replacement, out)?;
        }
        Ok(())
    }
}

fn normalize_topics(new_topics: &[String]) -> &[String] {
    if new_topics.len() == 1 && new_topics[0].is_empty() {
        &[]
    } else {
        new_topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_topics_passes_lists_through() {
        let topics = vec!["a".to_string(), "b".to_string()];
        assert_eq!(normalize_topics(&topics), topics.as_slice());
    }

    #[test]
    fn test_normalize_topics_single_empty_string_clears() {
        let topics = vec![String::new()];
        assert!(normalize_topics(&topics).is_empty());
    }

    #[test]
    fn test_normalize_topics_keeps_empty_string_among_others() {
        let topics = vec![String::new(), "a".to_string()];
        assert_eq!(normalize_topics(&topics), topics.as_slice());
    }
}
