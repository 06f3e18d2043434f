// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, time::Duration};

use clap::{ArgMatches, Command, arg, value_parser};
use colored::Colorize;
use tasksync_core::{ListSummary, SyncReport};

use crate::arg::{CommonArgs, OutputFormat};
use crate::cli::App;

#[derive(Debug, Clone)]
pub struct CmdSync {
    /// Seconds between two cycles; a single cycle when unset.
    pub watch: Option<u64>,
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Bring the local cache in step with the remote list")
            .arg(
                arg!(-w --watch <SECS> "Keep syncing, waiting SECS seconds between cycles")
                    .value_parser(value_parser!(u64).range(1..)),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            watch: matches.get_one("watch").copied(),
        }
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        let Some(secs) = self.watch else {
            let report = app.engine.sync(&app.cancel).await?;
            print_report(&report);
            return Ok(());
        };

        tracing::info!(secs, "watching for changes");
        let interval = Duration::from_secs(secs);
        loop {
            match app.engine.sync(&app.cancel).await {
                Ok(SyncReport::Cancelled) => break,
                Ok(report) => print_report(&report),
                // the next cycle reconnects if needed
                Err(e) if e.is_retryable() => {
                    tracing::warn!(error = %e, "sync failed, retrying on the next cycle");
                    println!("{} {e}", "Warning:".yellow());
                }
                Err(e) => return Err(e.into()),
            }

            tokio::select! {
                () = app.cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }
        tracing::info!("stopped watching");
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    match report {
        SyncReport::Unchanged => println!("{}", "Up to date".green()),
        SyncReport::Applied { .. } => println!("{} {report}", "Synced:".green()),
        SyncReport::Cancelled | SyncReport::AlreadyRunning => {
            println!("{} {report}", "Skipped:".yellow());
        }
    }
}

#[derive(Debug, Clone)]
pub struct CmdLists {
    pub output_format: OutputFormat,
}

impl CmdLists {
    pub const NAME: &str = "lists";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show the remote lists and which one is synchronized")
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        app.engine.connect(&app.cancel).await?;
        let lists = app.engine.list_lists(&app.cancel).await?;
        let bound = app.engine.list().map(|a| a.as_str().to_string());

        match self.output_format {
            OutputFormat::Json => {
                let value: Vec<_> = lists
                    .iter()
                    .map(|a| {
                        serde_json::json!({
                            "id": a.id.as_str(),
                            "title": a.title,
                            "updated": a.updated.map(|t| t.to_string()),
                            "synchronized": bound.as_deref() == Some(a.id.as_str()),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Table => {
                for list in &lists {
                    println!("{}", format_list(list, bound.as_deref()));
                }
            }
        }
        Ok(())
    }
}

fn format_list(list: &ListSummary, bound: Option<&str>) -> String {
    let marker = if bound == Some(list.id.as_str()) { "*" } else { " " };
    let title = list.title.as_deref().unwrap_or("(untitled)");
    let line = match list.updated {
        Some(updated) => format!("{marker} {} {title} ({updated})", list.id),
        None => format!("{marker} {} {title}", list.id),
    };
    if marker == "*" {
        line.bold().to_string()
    } else {
        line
    }
}
