//! Plain-text building blocks shared by the screens.

use std::fmt::Write;

pub const LOADING: &str = "Loading...";

/// Column-aligned text table
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<(bool, Vec<String>)>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push((false, cells));
    }

    /// A row marked with `*` in the first column
    pub fn highlighted_row(&mut self, cells: Vec<String>) {
        self.rows.push((true, cells));
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for (_, cells) in &self.rows {
            for (i, cell) in cells.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }

        let mut out = String::new();
        push_line(&mut out, ' ', &self.headers, &widths);
        push_line(
            &mut out,
            ' ',
            &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
            &widths,
        );
        for (highlighted, cells) in &self.rows {
            push_line(&mut out, if *highlighted { '*' } else { ' ' }, cells, &widths);
        }

        out
    }
}

fn push_line(out: &mut String, marker: char, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    line.push(marker);

    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let _ = write!(line, " {:<width$} ", cell, width = width);
    }

    out.push_str(line.trim_end());
    out.push('\n');
}

/// A section title followed by an underline
pub fn title(text: &str) -> String {
    format!("{}\n{}\n", text, "=".repeat(text.chars().count()))
}

pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}
