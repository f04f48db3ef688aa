//! Pure filter predicates. No state, no remote calls.

/// A combined group/project name filter, split at the first `/`.
///
/// `"foo/bar"` selects projects with "bar" in their name, in groups with
/// "foo" in their name; `"foo/"` filters groups only; `"/bar"` (or plain
/// `"bar"`) filters projects only. Any further slashes stay in the
/// project pattern and are matched as a flat substring by the remote
/// search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupProjectFilter {
    /// Substring pattern for group names; empty matches every group.
    pub group: String,
    /// Substring pattern for project names; empty matches every project.
    pub project: String,
}

impl GroupProjectFilter {
    /// Parse a combined filter string.
    pub fn parse(input: &str) -> Self {
        match input.split_once('/') {
            Some((group, project)) => Self {
                group: group.to_string(),
                project: project.to_string(),
            },
            None => Self {
                group: String::new(),
                project: input.to_string(),
            },
        }
    }
}

/// Select projects by topic state: only those with an empty topic list
/// when `want_empty`, only those with topics otherwise.
pub fn topic_state_matches(topic_count: usize, want_empty: bool) -> bool {
    if want_empty {
        topic_count == 0
    } else {
        topic_count > 0
    }
}

/// `true` when no topics are wanted, or when the intersection of the two
/// sets is non-empty. Order-insignificant.
pub fn topics_match(topics: &[String], wanted: &[String]) -> bool {
    wanted.is_empty() || topics.iter().any(|topic| wanted.iter().any(|w| w == topic))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_splits_at_slash() {
        let filter = GroupProjectFilter::parse("foo/bar");
        assert_eq!(filter.group, "foo");
        assert_eq!(filter.project, "bar");
    }

    #[test]
    fn test_parse_without_slash_is_project_only() {
        let filter = GroupProjectFilter::parse("bar");
        assert_eq!(filter.group, "");
        assert_eq!(filter.project, "bar");
    }

    #[test]
    fn test_parse_group_only() {
        let filter = GroupProjectFilter::parse("foo/");
        assert_eq!(filter.group, "foo");
        assert_eq!(filter.project, "");
    }

    #[test]
    fn test_parse_project_only() {
        let filter = GroupProjectFilter::parse("/bar");
        assert_eq!(filter.group, "");
        assert_eq!(filter.project, "bar");
    }

    #[test]
    fn test_parse_match_everything() {
        let filter = GroupProjectFilter::parse("/");
        assert_eq!(filter, GroupProjectFilter::default());
    }

    #[test]
    fn test_parse_splits_at_first_slash_only() {
        let filter = GroupProjectFilter::parse("foo/bar/baz");
        assert_eq!(filter.group, "foo");
        assert_eq!(filter.project, "bar/baz");
    }

    #[test]
    fn test_topic_state_matches() {
        assert!(topic_state_matches(0, true));
        assert!(!topic_state_matches(2, true));
        assert!(topic_state_matches(2, false));
        assert!(!topic_state_matches(0, false));
    }

    #[test]
    fn test_topics_match_empty_wanted_matches_all() {
        assert!(topics_match(&strings(&["a", "b"]), &[]));
        assert!(topics_match(&[], &[]));
    }

    #[test]
    fn test_topics_match_intersection() {
        let topics = strings(&["rust", "cli"]);
        assert!(topics_match(&topics, &strings(&["cli", "python"])));
        assert!(!topics_match(&topics, &strings(&["python"])));
        assert!(!topics_match(&[], &strings(&["python"])));
    }
}
