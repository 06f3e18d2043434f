// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use colored::Color;
use jiff::civil::Date;
use tasksync_gtasks::Task;

use crate::arg::OutputFormat;
use crate::table::{Column, PaddingDirection, Table};

#[derive(Debug)]
pub struct TaskFormatter {
    columns: Vec<TaskColumn>,
    today: Date,
    format: OutputFormat,
}

impl TaskFormatter {
    pub fn new(today: Date, format: OutputFormat) -> Self {
        Self {
            columns: vec![
                TaskColumn::Status,
                TaskColumn::Id,
                TaskColumn::Due,
                TaskColumn::Summary,
            ],
            today,
            format,
        }
    }

    pub fn format(&self, tasks: &[Task]) -> Result<String, Box<dyn Error>> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(tasks)?),
            OutputFormat::Table => {
                let table = Table {
                    columns: &self.columns,
                    data: tasks,
                    today: self.today,
                    separator: " ",
                };
                let mut buf = Vec::new();
                table.write_to(&mut buf)?;
                let mut out = String::from_utf8(buf)?;
                out.truncate(out.trim_end().len());
                Ok(out)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TaskColumn {
    Status,
    Id,
    Due,
    Summary,
}

impl Column<Task> for TaskColumn {
    fn format(&self, task: &Task) -> String {
        match self {
            Self::Status if task.is_completed() => "[x]".to_string(),
            Self::Status => "[ ]".to_string(),
            Self::Id => task.uid.clone().unwrap_or_default(),
            Self::Due => task.due.map(|a| a.to_string()).unwrap_or_default(),
            Self::Summary if task.parent.is_some() => format!("  {}", task.summary),
            Self::Summary => task.summary.clone(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            Self::Due => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn get_color(&self, today: Date, task: &Task) -> Option<Color> {
        const COLOR_OVERDUE: Option<Color> = Some(Color::Red);
        const COLOR_TODAY: Option<Color> = Some(Color::Yellow);

        match self {
            Self::Due if !task.is_completed() => match task.due {
                Some(due) if due < today => COLOR_OVERDUE,
                Some(due) if due == today => COLOR_TODAY,
                _ => None,
            },
            Self::Status if task.is_completed() => Some(Color::Green),
            _ => None,
        }
    }
}
