// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use clap::{
    ArgAction, ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser,
};
use colored::Colorize;
use futures::{FutureExt, future::LocalBoxFuture};
use tasksync_core::{APP_NAME, SqliteStore, SyncEngine};
use tasksync_gtasks::{GTasksBackend, Task, TaskMapper, credentials_from};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cmd_sync::{CmdLists, CmdSync};
use crate::cmd_task::{CmdTaskAdd, CmdTaskDone, CmdTaskList, CmdTaskRemove, CmdTaskUndo};
use crate::config::parse_config;

const CACHE_FILE: &str = "cache.db";

/// Run the tasksync command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return Ok(());
        }
    };

    init_tracing(cli.verbose);
    if let Err(e) = cli.run().await {
        eprintln!("{} {}", "Error:".red(), e);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Log debug output when `RUST_LOG` is unset
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Keep a local task cache in step with a remote task list.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $TASKSYNC_CONFIG, then \
$XDG_CONFIG_HOME/tasksync/config.toml on Linux and MacOS, \
%LOCALAPPDATA%/tasksync/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath)
                    .global(true),
            )
            .arg(
                arg!(-v --verbose "Print debug logs to stderr")
                    .action(ArgAction::SetTrue)
                    .global(true),
            )
            .subcommand(CmdSync::command())
            .subcommand(CmdLists::command())
            .subcommand(CmdTaskList::command())
            .subcommand(CmdTaskAdd::command())
            .subcommand(CmdTaskDone::command())
            .subcommand(CmdTaskUndo::command())
            .subcommand(CmdTaskRemove::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some((CmdLists::NAME, matches)) => Lists(CmdLists::from(matches)),
            Some((CmdTaskList::NAME, matches)) => List(CmdTaskList::from(matches)),
            Some((CmdTaskAdd::NAME, matches)) => Add(CmdTaskAdd::from(matches)?),
            Some((CmdTaskDone::NAME, matches)) => Done(CmdTaskDone::from(matches)),
            Some((CmdTaskUndo::NAME, matches)) => Undo(CmdTaskUndo::from(matches)),
            Some((CmdTaskRemove::NAME, matches)) => Remove(CmdTaskRemove::from(matches)),
            _ => return Err("No command given, see --help".into()),
        };

        let config = matches.get_one("config").cloned();
        let verbose = matches.get_flag("verbose");
        Ok(Cli {
            config,
            verbose,
            command,
        })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Run one synchronization cycle, or keep watching
    Sync(CmdSync),

    /// Show the remote lists
    Lists(CmdLists),

    /// List cached tasks
    List(CmdTaskList),

    /// Create a task
    Add(CmdTaskAdd),

    /// Mark tasks as completed
    Done(CmdTaskDone),

    /// Mark tasks as not completed
    Undo(CmdTaskUndo),

    /// Delete tasks
    Remove(CmdTaskRemove),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Sync(a)   => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Lists(a)  => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            List(a)   => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Add(a)    => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Done(a)   => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Undo(a)   => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Remove(a) => Self::run_with(config, |x| a.run(x).boxed_local()).await,
        }
    }

    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a mut App) -> LocalBoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration");
        let config = parse_config(config).await?;
        let credentials = credentials_from(&config.gtasks)?;

        let state_dir = config
            .sync
            .state_dir
            .clone()
            .ok_or("No state directory configured")?;
        fs::create_dir_all(&state_dir).await?;
        let store = SqliteStore::<Task>::open(Some(&state_dir.join(CACHE_FILE))).await?;

        let engine = SyncEngine::new(
            &config.sync,
            GTasksBackend::new(config.gtasks.clone()),
            credentials,
            store,
            TaskMapper,
        );

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupted, cancelling");
                    cancel.cancel();
                }
            }
        });

        let mut app = App { engine, cancel };
        let res = f(&mut app).await;

        interrupt.abort();
        app.engine.into_store().close().await;
        res
    }
}

/// The engine used by every command.
pub type Engine = SyncEngine<GTasksBackend, SqliteStore<Task>, TaskMapper>;

/// Shared state handed to a command.
#[derive(Debug)]
pub struct App {
    pub engine: Engine,
    pub cancel: CancellationToken,
}
