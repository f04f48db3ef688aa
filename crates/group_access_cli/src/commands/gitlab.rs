use std::io;

use group_access::{
    GitlabApi, GroupManager, GroupProjectFilter, MergeRequestManager, MergeStyle, ProjectManager,
    Result, TopicManager,
};

use crate::config::Config;
use crate::{ConnectionOptions, GitlabAction};

pub(crate) fn handle_gitlab(
    connection: &ConnectionOptions,
    action: GitlabAction,
    config: &Config,
) -> Result<()> {
    // Resolve connection details: CLI flag > env > config file > default
    let uri = config.gitlab_uri(connection.uri.clone());
    let token = config.gitlab_token(connection.token.clone());

    let api = GitlabApi::connect(&uri, token.as_deref(), connection.insecure)?;
    tracing::debug!(url = %api.url(), "running against");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match action {
        GitlabAction::Topics {
            filter,
            empty,
            no_empty: _,
            set_topic,
        } => {
            let manager = TopicManager::new(&api, GroupProjectFilter::parse(&filter), empty);
            if set_topic.is_empty() {
                manager.show(&mut out)
            } else {
                manager.set(&set_topic, &mut out)
            }
        }
        GitlabAction::Mrs {
            filter,
            labels,
            merge,
        } => {
            let manager = MergeRequestManager::new(
                &api,
                GroupProjectFilter::parse(&filter),
                labels,
                MergeStyle::from(merge),
            );
            let stdin = io::stdin();
            let mut input = stdin.lock();
            manager.merge_all(&mut input, &mut out)
        }
        GitlabAction::Projects { filter, topics } => {
            let manager = ProjectManager::new(&api, GroupProjectFilter::parse(&filter), topics);
            manager.show(&mut out)
        }
        GitlabAction::Groups {
            username,
            group_filter,
            member: _,
            no_member,
            set_permission,
        } => {
            let manager = GroupManager::new(&api, group_filter, &username, !no_member)?;
            match set_permission {
                Some(permission) => manager.set(permission, &mut out),
                None => manager.show(&mut out),
            }
        }
    }
}
