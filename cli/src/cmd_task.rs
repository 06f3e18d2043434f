// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cmp::Ordering, error::Error};

use clap::{ArgMatches, Command};
use colored::Colorize;
use jiff::{Timestamp, Zoned, civil::Date};
use tasksync_core::SyncError;
use tasksync_gtasks::{Task, TaskStatus};

use crate::arg::{CommonArgs, OutputFormat, TaskArgs};
use crate::cli::App;
use crate::task_formatter::TaskFormatter;

#[derive(Debug, Clone)]
pub struct CmdTaskList {
    pub all: bool,
    pub output_format: OutputFormat,
}

impl CmdTaskList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List cached tasks, without contacting the server")
            .arg(TaskArgs::all())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            all: TaskArgs::get_all(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        tracing::debug!(all = self.all, "listing cached tasks");
        let mut tasks: Vec<Task> = app
            .engine
            .store()
            .list_items()
            .await?
            .into_iter()
            .map(|a| a.payload)
            .filter(|a| self.all || !a.is_completed())
            .collect();
        tasks.sort_by(compare_tasks);

        let formatter = TaskFormatter::new(Zoned::now().date(), self.output_format);
        println!("{}", formatter.format(&tasks)?);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdTaskAdd {
    pub summary: String,
    pub description: Option<String>,
    pub due: Option<Date>,
    pub parent: Option<String>,
    pub output_format: OutputFormat,
}

impl CmdTaskAdd {
    pub const NAME: &str = "add";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("new")
            .about("Create a task on the server and cache it")
            .arg(TaskArgs::summary())
            .arg(TaskArgs::description())
            .arg(TaskArgs::due())
            .arg(TaskArgs::parent())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let summary = TaskArgs::get_summary(matches).ok_or("Summary is required for a new task")?;
        Ok(Self {
            summary,
            description: TaskArgs::get_description(matches),
            due: TaskArgs::get_due(matches),
            parent: TaskArgs::get_parent(matches),
            output_format: CommonArgs::get_output_format(matches),
        })
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        tracing::debug!(summary = %self.summary, "adding task");
        let mut task = Task::new(self.summary);
        task.description = self.description;
        task.due = self.due;
        task.parent = self.parent;

        app.engine.connect(&app.cancel).await?;
        let item = app.engine.create_item(&task, &app.cancel).await?;

        let formatter = TaskFormatter::new(Zoned::now().date(), self.output_format);
        println!("{}", formatter.format(&[item.payload])?);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdTaskDone {
    pub ids: Vec<String>,
    pub output_format: OutputFormat,
}

impl CmdTaskDone {
    pub const NAME: &str = "done";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Mark tasks as completed")
            .arg(CommonArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: CommonArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        tracing::debug!(ids = ?self.ids, "marking tasks as completed");
        set_status(app, &self.ids, TaskStatus::Completed, self.output_format).await
    }
}

#[derive(Debug, Clone)]
pub struct CmdTaskUndo {
    pub ids: Vec<String>,
    pub output_format: OutputFormat,
}

impl CmdTaskUndo {
    pub const NAME: &str = "undo";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Mark tasks as not completed")
            .arg(CommonArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: CommonArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        tracing::debug!(ids = ?self.ids, "marking tasks as not completed");
        set_status(app, &self.ids, TaskStatus::NeedsAction, self.output_format).await
    }
}

#[derive(Debug, Clone)]
pub struct CmdTaskRemove {
    pub ids: Vec<String>,
}

impl CmdTaskRemove {
    pub const NAME: &str = "remove";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete tasks from the server and the cache")
            .arg(CommonArgs::ids())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: CommonArgs::get_ids(matches),
        }
    }

    pub async fn run(self, app: &mut App) -> Result<(), Box<dyn Error>> {
        app.engine.connect(&app.cancel).await?;
        for id in &self.ids {
            tracing::debug!(%id, "removing task");
            app.engine.remove(id, &app.cancel).await?;
            println!("{} {id}", "Removed".green());
        }
        Ok(())
    }
}

async fn set_status(
    app: &mut App,
    ids: &[String],
    status: TaskStatus,
    output_format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    app.engine.connect(&app.cancel).await?;

    let mut tasks = Vec::with_capacity(ids.len());
    for id in ids {
        let mut task = app
            .engine
            .cached(id)
            .await?
            .ok_or_else(|| SyncError::NotFound { id: id.clone() })?
            .payload;
        task.status = status;
        task.completed = match status {
            TaskStatus::Completed => Some(Timestamp::now()),
            TaskStatus::NeedsAction => None,
        };

        let item = app.engine.modify_item(&task, &app.cancel).await?;
        tasks.push(item.payload);
    }

    let formatter = TaskFormatter::new(Zoned::now().date(), output_format);
    println!("{}", formatter.format(&tasks)?);
    Ok(())
}

/// Open tasks first, then by due date with undated tasks last, then by summary.
fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.is_completed()
        .cmp(&b.is_completed())
        .then_with(|| match (a.due, b.due) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.summary.cmp(&b.summary))
}
