// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io;

use colored::{Color, Colorize};
use jiff::civil::Date;
use unicode_width::UnicodeWidthStr;

/// A plain-text table, one row per item.
pub struct Table<'a, T, C: Column<T>> {
    pub columns: &'a [C],
    pub data: &'a [T],
    pub today: Date,
    pub separator: &'a str,
}

impl<T, C: Column<T>> Table<'_, T, C> {
    pub fn write_to(&self, w: &mut impl io::Write) -> io::Result<()> {
        let table: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|row| self.columns.iter().map(|col| col.format(row)).collect())
            .collect();

        let widths = column_max_width(&table, self.columns.len());
        let last = self.columns.len().saturating_sub(1);
        for (cells, row) in table.into_iter().zip(self.data) {
            let cols = self.columns.iter().zip(cells).zip(widths.iter().copied());
            for (j, ((col, cell), width)) in cols.enumerate() {
                // the last column is not padded if it is left-aligned
                let cell = match col.padding_direction() {
                    PaddingDirection::Left if j == last => cell,
                    PaddingDirection::Left => format!("{cell:<width$}"),
                    PaddingDirection::Right => format!("{cell:>width$}"),
                };
                let cell = match col.get_color(self.today, row) {
                    Some(color) => cell.color(color).to_string(),
                    None => cell,
                };

                if j < last {
                    write!(w, "{cell}{}", self.separator)?;
                } else {
                    writeln!(w, "{cell}")?;
                }
            }
        }
        Ok(())
    }
}

pub trait Column<T> {
    fn format(&self, data: &T) -> String;
    fn padding_direction(&self) -> PaddingDirection;
    fn get_color(&self, today: Date, data: &T) -> Option<Color>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

fn column_max_width(table: &[Vec<String>], columns: usize) -> Vec<usize> {
    let mut max_width = vec![0; columns];
    for row in table {
        for (max, cell) in max_width.iter_mut().zip(row) {
            *max = (*max).max(cell.width());
        }
    }
    max_width
}
