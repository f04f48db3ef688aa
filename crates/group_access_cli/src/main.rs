//! group-access-tool - manage topics, merge requests and group access on
//! GitLab instances.

mod commands;
mod config;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use group_access::{short_error_message, MergeStyle, Permission};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "group-access-tool")]
#[command(version)]
#[command(about = "Manage topics, merge requests and group access on GitLab")]
#[command(
    long_about = "group-access-tool discovers GitLab groups and projects by name filter and \
applies bulk metadata operations on them: listing and setting project topics, \
showing and merging open merge requests, and granting or revoking group \
memberships."
)]
#[command(after_long_help = r#"EXAMPLES
    List projects without topics across all groups:
        $ group-access-tool gitlab topics / --empty

    Tag every infrastructure project:
        $ group-access-tool gitlab topics infra/ --empty --set-topic infrastructure

    Merge release-labeled MRs after confirmation:
        $ group-access-tool gitlab mrs / --label release --merge yes

    Make alice a maintainer of every team group:
        $ group-access-tool gitlab groups alice --group-filter team --no-member \
              --set-permission maintainer

CONFIGURATION
    group-access-tool reads configuration from:
      1. ~/.config/group-access-tool/config.toml
      2. ./group-access-tool.toml
      3. Environment variables (GROUP_ACCESS_* prefix)
      4. .env file in the current directory

ENVIRONMENT VARIABLES
    GROUP_ACCESS_GITLAB_URI      GitLab host URI (default: https://gitlab.com)
    GROUP_ACCESS_GITLAB_TOKEN    GitLab personal access token
"#)]
struct Cli {
    /// Print full error details instead of a one-line message.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GitLab operations
    Gitlab {
        #[command(flatten)]
        connection: ConnectionOptions,

        #[command(subcommand)]
        action: GitlabAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Connection options shared by all GitLab subcommands.
#[derive(Debug, Clone, Args)]
struct ConnectionOptions {
    /// Location of the GitLab host (default: https://gitlab.com, or
    /// GROUP_ACCESS_GITLAB_URI).
    #[arg(long)]
    uri: Option<String>,

    /// Access token; anonymous access if none is supplied (or
    /// GROUP_ACCESS_GITLAB_TOKEN).
    #[arg(long)]
    token: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long)]
    insecure: bool,
}

const FILTER_HELP: &str = r#"FILTER SYNTAX
    foo/bar ... projects that have "bar" in their name,
                in groups that have "foo" in their name
    foo/    ... filter for groups only, match any project
    /bar    ... filter for projects only, match any group
"#;

#[derive(Subcommand)]
enum GitlabAction {
    /// List and manage topics on GitLab projects
    #[command(after_help = FILTER_HELP)]
    Topics {
        /// Combined group/project name filter.
        #[arg(value_name = "GROUP/PROJECT-FILTER", default_value = "/")]
        filter: String,

        /// Select projects with an empty topic list.
        #[arg(long, overrides_with = "no_empty")]
        empty: bool,

        /// Select projects with a non-empty topic list (default).
        #[arg(long, overrides_with = "empty")]
        no_empty: bool,

        /// Topic to set; use multiple times to set more than one.
        /// Use "" to clear topics.
        #[arg(long = "set-topic", value_name = "TOPIC")]
        set_topic: Vec<String>,
    },
    /// List and merge open merge requests
    #[command(after_help = FILTER_HELP)]
    Mrs {
        /// Combined group/project name filter.
        #[arg(value_name = "GROUP/PROJECT-FILTER", default_value = "/")]
        filter: String,

        /// Label filter; use multiple times to filter with more than one
        /// label.
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Merge strategy for mergeable merge requests.
        #[arg(long, value_enum, default_value_t = MergeStyleArg::No)]
        merge: MergeStyleArg,
    },
    /// List projects, optionally by topic
    #[command(after_help = FILTER_HELP)]
    Projects {
        /// Combined group/project name filter.
        #[arg(value_name = "GROUP/PROJECT-FILTER", default_value = "/")]
        filter: String,

        /// Topic filter; use multiple times to filter with more than one
        /// topic.
        #[arg(long = "topic", value_name = "TOPIC")]
        topics: Vec<String>,
    },
    /// Show and manage group memberships of a user
    Groups {
        /// Username to inspect; must resolve to exactly one account.
        username: String,

        /// Group name filter.
        #[arg(long, default_value = "")]
        group_filter: String,

        /// Select groups the user is a member of (default).
        #[arg(long, overrides_with = "no_member")]
        member: bool,

        /// Select groups the user is not a member of.
        #[arg(long, overrides_with = "member")]
        no_member: bool,

        /// Permission level to set; 'none' revokes membership.
        #[arg(long, value_parser = parse_permission, value_name = "LEVEL")]
        set_permission: Option<Permission>,
    },
}

/// CLI-facing merge strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum MergeStyleArg {
    No,
    Yes,
    Automatic,
}

impl From<MergeStyleArg> for MergeStyle {
    fn from(style: MergeStyleArg) -> Self {
        match style {
            MergeStyleArg::No => MergeStyle::No,
            MergeStyleArg::Yes => MergeStyle::Yes,
            MergeStyleArg::Automatic => MergeStyle::Automatic,
        }
    }
}

fn parse_permission(value: &str) -> Result<Permission, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "group_access=debug,group_access_cli=debug"
    } else {
        "group_access=warn,group_access_cli=warn"
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let debug = cli.debug;
    init_tracing(debug);

    // Load configuration (config file -> env vars); CLI flags override.
    let config = config::Config::load();

    let result = match cli.command {
        Commands::Gitlab { connection, action } => {
            commands::gitlab::handle_gitlab(&connection, action, &config)
        }
        Commands::Completions { shell } => commands::meta::handle_completions(shell),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if debug {
                eprintln!("{err:?}");
            } else {
                eprintln!("Error: {}. Aborting.", short_error_message(&err));
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_topics_defaults() {
        let cli = Cli::try_parse_from(["group-access-tool", "gitlab", "topics"]).unwrap();
        let Commands::Gitlab { action, .. } = cli.command else {
            panic!("expected gitlab subcommand");
        };
        let GitlabAction::Topics {
            filter,
            empty,
            set_topic,
            ..
        } = action
        else {
            panic!("expected topics action");
        };
        assert_eq!(filter, "/");
        assert!(!empty);
        assert!(set_topic.is_empty());
    }

    #[test]
    fn test_merge_style_parses() {
        let cli = Cli::try_parse_from([
            "group-access-tool",
            "gitlab",
            "mrs",
            "foo/bar",
            "--merge",
            "automatic",
        ])
        .unwrap();
        let Commands::Gitlab { action, .. } = cli.command else {
            panic!("expected gitlab subcommand");
        };
        let GitlabAction::Mrs { merge, .. } = action else {
            panic!("expected mrs action");
        };
        assert_eq!(merge, MergeStyleArg::Automatic);
    }

    #[test]
    fn test_member_flags_last_one_wins() {
        let cli = Cli::try_parse_from([
            "group-access-tool",
            "gitlab",
            "groups",
            "alice",
            "--member",
            "--no-member",
        ])
        .unwrap();
        let Commands::Gitlab { action, .. } = cli.command else {
            panic!("expected gitlab subcommand");
        };
        let GitlabAction::Groups { no_member, .. } = action else {
            panic!("expected groups action");
        };
        assert!(no_member);
    }

    #[test]
    fn test_invalid_permission_is_rejected() {
        let result = Cli::try_parse_from([
            "group-access-tool",
            "gitlab",
            "groups",
            "alice",
            "--set-permission",
            "tsar",
        ]);
        assert!(result.is_err());
    }
}
