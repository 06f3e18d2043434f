// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgAction, ArgMatches, arg, value_parser};
use jiff::civil::Date;

/// The output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn output_format() -> Arg {
        arg!(--"output-format" <FORMAT> "Output format")
            .value_parser(value_parser!(OutputFormat))
            .default_value("table")
    }

    pub fn get_output_format(matches: &ArgMatches) -> OutputFormat {
        matches
            .get_one("output-format")
            .copied()
            .unwrap_or(OutputFormat::Table)
    }

    pub fn ids() -> Arg {
        arg!(id: <ID> "The id of the task").num_args(1..)
    }

    pub fn get_ids(matches: &ArgMatches) -> Vec<String> {
        matches
            .get_many::<String>("id")
            .map(|a| a.cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TaskArgs;

impl TaskArgs {
    pub fn summary() -> Arg {
        arg!(summary: <SUMMARY> "Summary of the task")
    }

    pub fn get_summary(matches: &ArgMatches) -> Option<String> {
        matches.get_one("summary").cloned()
    }

    pub fn description() -> Arg {
        arg!(--description <DESCRIPTION> "Description of the task").short('d')
    }

    pub fn get_description(matches: &ArgMatches) -> Option<String> {
        matches.get_one("description").cloned()
    }

    pub fn due() -> Arg {
        arg!(--due <DUE> "Due date of the task, in YYYY-MM-DD").value_parser(parse_date)
    }

    pub fn get_due(matches: &ArgMatches) -> Option<Date> {
        matches.get_one("due").copied()
    }

    pub fn parent() -> Arg {
        arg!(--parent <PARENT> "Id of the parent task")
    }

    pub fn get_parent(matches: &ArgMatches) -> Option<String> {
        matches.get_one("parent").cloned()
    }

    pub fn all() -> Arg {
        arg!(-a --all "Include completed tasks").action(ArgAction::SetTrue)
    }

    pub fn get_all(matches: &ArgMatches) -> bool {
        matches.get_flag("all")
    }
}

fn parse_date(s: &str) -> Result<Date, String> {
    s.parse()
        .map_err(|_| format!("Invalid date `{s}`. Expected format: YYYY-MM-DD"))
}
