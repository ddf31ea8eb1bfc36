use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hand off in-progress editor work to the Jules remote coding agent
#[derive(Parser)]
#[command(name = "handoff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as MCP server over stdio
    #[arg(long)]
    pub mcp: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (auto-detects git root if absent)
    #[arg(short = 'w', long, global = true)]
    pub workspace_root: Option<String>,

    /// Directory for settings, credentials and drafts. Defaults to ~/.jules-handoff
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the Jules API key
    SetKey {
        /// API key (prompted for on stdin when omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove the stored Jules API key
    ClearKey,
    /// Show credential, repository and artifact readiness
    Status,
    /// Sync, gather context, review the prompt and create a Jules session
    Start {
        /// Editor snapshot JSON written by an editor plugin
        #[arg(long)]
        editor_state: Option<PathBuf>,

        /// Artifact context id (defaults to the most recent)
        #[arg(long, conflicts_with = "no_artifacts")]
        context: Option<String>,

        /// Leave planning artifacts out of the prompt
        #[arg(long)]
        no_artifacts: bool,

        /// Commit and push uncommitted changes without asking
        #[arg(long)]
        auto_sync: bool,

        /// Save the draft and stop instead of opening $EDITOR
        #[arg(long)]
        no_edit: bool,

        /// Print the dashboard URL instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Print the prompt that would be sent, without touching git
    Preview {
        /// Editor snapshot JSON written by an editor plugin
        #[arg(long)]
        editor_state: Option<PathBuf>,

        /// Artifact context id (defaults to the most recent)
        #[arg(long, conflicts_with = "no_artifacts")]
        context: Option<String>,

        /// Leave planning artifacts out of the prompt
        #[arg(long)]
        no_artifacts: bool,
    },
    /// Submit a previously prepared, edited prompt
    Send {
        /// Prompt file; defaults to the newest saved draft
        file: Option<PathBuf>,

        /// Session title (derived from the mission brief if absent)
        #[arg(long)]
        title: Option<String>,

        /// Print the dashboard URL instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// List prior agent sessions with saved artifacts
    Contexts {
        /// Maximum number of contexts to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Persist one setting
    Set {
        /// Setting name, e.g. autoSync or maxPromptLength
        key: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_start_flags() {
        let cli = Cli::parse_from([
            "handoff",
            "--cache-dir",
            "/tmp/cache",
            "start",
            "--context",
            "conv-1",
            "--auto-sync",
            "--no-edit",
        ]);
        assert_eq!(cli.cache_dir.as_deref(), Some("/tmp/cache"));
        match cli.command {
            Some(Commands::Start {
                context,
                auto_sync,
                no_edit,
                no_artifacts,
                ..
            }) => {
                assert_eq!(context.as_deref(), Some("conv-1"));
                assert!(auto_sync);
                assert!(no_edit);
                assert!(!no_artifacts);
            }
            _ => panic!("expected start"),
        }
    }

    #[test]
    fn test_context_conflicts_with_no_artifacts() {
        let result = Cli::try_parse_from([
            "handoff",
            "preview",
            "--context",
            "conv-1",
            "--no-artifacts",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_send_file_is_optional() {
        let cli = Cli::parse_from(["handoff", "send", "--no-open"]);
        match cli.command {
            Some(Commands::Send { file, no_open, .. }) => {
                assert_eq!(file, None);
                assert!(no_open);
            }
            _ => panic!("expected send"),
        }

        let cli = Cli::parse_from(["handoff", "send", "draft.md"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Send { file: Some(ref f), .. }) if f == &PathBuf::from("draft.md")
        ));
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::parse_from(["handoff", "config", "set", "autoSync", "true"]);
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Set { key, value },
            }) => {
                assert_eq!(key, "autoSync");
                assert_eq!(value, "true");
            }
            _ => panic!("expected config set"),
        }
    }
}
