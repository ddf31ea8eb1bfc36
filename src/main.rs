use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod cli;
mod command;
mod context;
mod credentials;
mod domain;
mod drafts;
mod editor;
mod environment;
mod error;
mod handoff;
mod mcp;
mod prompt;
mod settings;
mod vcs;

use cli::{Cli, Commands, ConfigAction};
use environment::Environment;
use error::HandoffError;
use settings::{resolve_cache_dir, SettingsStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("❌ {:#}", e);
        if let Some(hint) = e.downcast_ref::<HandoffError>().and_then(|e| e.remediation()) {
            eprintln!("   {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cache_dir = resolve_cache_dir(cli.cache_dir.as_deref())?;
    let settings = SettingsStore::new(&cache_dir).load_effective()?;

    // Config commands must work even when the stored settings are invalid
    if let Some(Commands::Config { action }) = &cli.command {
        return match action {
            ConfigAction::Show => command::run_config_show(&settings, &cache_dir),
            ConfigAction::Set { key, value } => command::run_config_set(&cache_dir, key, value),
        };
    }

    settings.validate()?;
    let env = Environment {
        workspace_root: cli::resolve_workspace_root(cli.workspace_root.as_deref())?,
        cache_dir,
        settings,
    };

    if cli.mcp {
        return mcp::run_mcp_server(env).await;
    }

    match cli.command {
        Some(Commands::SetKey { key }) => command::run_set_key(&env.secrets(), key).await,
        Some(Commands::ClearKey) => command::run_clear_key(&env.secrets()).await,
        Some(Commands::Status) => command::run_status(&env).await,
        Some(Commands::Start {
            editor_state,
            context,
            no_artifacts,
            auto_sync,
            no_edit,
            no_open,
        }) => {
            let options = command::StartOptions {
                editor_state,
                selection: command::context_selection(context, no_artifacts),
                auto_sync,
                no_edit,
                no_open,
            };
            command::run_start(&env, options).await
        }
        Some(Commands::Preview {
            editor_state,
            context,
            no_artifacts,
        }) => {
            command::run_preview(
                &env,
                editor_state.as_deref(),
                command::context_selection(context, no_artifacts),
            )
            .await
        }
        Some(Commands::Send {
            file,
            title,
            no_open,
        }) => command::run_send(&env, file.as_deref(), title.as_deref(), no_open).await,
        Some(Commands::Contexts { limit }) => command::run_contexts(&env, limit).await,
        Some(Commands::Config { .. }) => Ok(()),
        None => {
            // No command specified, show help
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Use 'handoff set-key' to store your Jules API key, then 'handoff start'.");
            Ok(())
        }
    }
}
