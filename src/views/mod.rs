//! Headless view state for the console pages.
//!
//! Views hold what a page shows (rows, selection, pager, form state) and
//! render it to plain text rows. They never fetch; services do.

pub mod agents;
pub mod calls;
pub mod list_detail;
pub mod notes;
pub mod pagination;
pub mod tickets;
pub mod users;

use std::fmt;

use crate::error::ApiError;

pub use list_detail::{DetailPanel, Identified, ListDetail};
pub use pagination::{ClientPager, ServerPager};

/// Load status of a page's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(String),
    Empty(String),
    Ready,
}

impl LoadState {
    /// Inline error text: `Failed to load <Resource>: <message>`.
    pub fn failed(resource: &str, err: &ApiError) -> Self {
        LoadState::Failed(format!("Failed to load {resource}: {err}"))
    }

    /// `Empty` or `Ready` depending on the item count.
    pub fn loaded(count: usize, empty_text: &str) -> Self {
        if count == 0 {
            LoadState::Empty(empty_text.to_string())
        } else {
            LoadState::Ready
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) | LoadState::Empty(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Loading => f.write_str("Loading..."),
            LoadState::Failed(msg) | LoadState::Empty(msg) => f.write_str(msg),
            LoadState::Ready => Ok(()),
        }
    }
}

/// A rendered table: header plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Fixed-width text layout for terminals.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(self.headers.clone())];
        out.extend(
            self.rows
                .iter()
                .map(|r| line(r.iter().map(String::as_str).collect())),
        );
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_messages() {
        let err = ApiError::Network("connection refused".into());
        let state = LoadState::failed("Tickets", &err);
        assert_eq!(
            state.message(),
            Some("Failed to load Tickets: Network error: connection refused")
        );
        assert_eq!(
            LoadState::loaded(0, "No tickets found."),
            LoadState::Empty("No tickets found.".into())
        );
        assert!(LoadState::loaded(2, "No tickets found.").is_ready());
    }

    #[test]
    fn test_table_render_aligns_columns() {
        let mut table = Table::new(vec!["Sr. No", "User"]);
        table.push(vec!["1".into(), "Dana".into()]);
        table.push(vec!["10".into(), "Unknown".into()]);
        let text = table.render();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Sr. No  User");
        assert_eq!(lines[1], "1       Dana");
        assert_eq!(lines[2], "10      Unknown");
    }
}
