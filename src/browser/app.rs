//! Browser state: the engine it drives plus filter, selection and view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::TableState;
use std::path::Path;

use crate::catalog::Row;
use crate::engine::TrashEngine;
use crate::fs::{FileSystem, RealFileSystem};
use crate::models::EntryId;

/// Extensions whose content is previewed in the detail view.
const TEXT_EXTENSIONS: [&str; 11] = [
    "txt", "md", "go", "rs", "json", "xml", "sh", "log", "csv", "bat", "toml",
];

const PREVIEW_LIMIT: usize = 64 * 1024;
const PAGE: usize = 20;

/// Colours of every view, handed to [`Browser::new`].
#[derive(Debug, Clone, Copy)]
pub struct BrowserStyle {
    pub title: Style,
    pub header: Style,
    pub border: Style,
    pub selected: Style,
    pub error: Style,
    pub hint: Style,
}

impl Default for BrowserStyle {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Indexed(229))
                .add_modifier(Modifier::BOLD),
            header: Style::default().add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::Indexed(240)),
            selected: Style::default()
                .fg(Color::Indexed(229))
                .bg(Color::Indexed(29)),
            error: Style::default().fg(Color::Red),
            hint: Style::default().fg(Color::DarkGray),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Table,
    Detail(EntryId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a filter; rows follow the text as it is typed.
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Content preview shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub text: String,
    pub scroll: u16,
}

pub struct Browser {
    engine: TrashEngine,
    pub style: BrowserStyle,
    pub view: View,
    pub mode: InputMode,
    /// Filter applied to the table.
    pub filter: String,
    /// Filter text being edited.
    pub input: String,
    pub table_state: TableState,
    pub preview: Option<Preview>,
    pub status: Status,
    pub should_quit: bool,
}

impl Browser {
    pub fn new(engine: TrashEngine, style: BrowserStyle) -> Self {
        let status = Status::Info(format!("{} items in trash", engine.catalog().len()));
        let mut browser = Self {
            engine,
            style,
            view: View::Table,
            mode: InputMode::Normal,
            filter: String::new(),
            input: String::new(),
            table_state: TableState::default(),
            preview: None,
            status,
            should_quit: false,
        };
        browser.clamp_selection();
        browser
    }

    pub fn engine(&self) -> &TrashEngine {
        &self.engine
    }

    fn active_filter(&self) -> &str {
        match self.mode {
            InputMode::Filter => &self.input,
            InputMode::Normal => &self.filter,
        }
    }

    /// Rows currently on screen, projected from the catalog.
    pub fn visible_rows(&self) -> Vec<Row> {
        self.engine.catalog().filter_rows(self.active_filter())
    }

    pub fn selected_row(&self) -> Option<Row> {
        let index = self.table_state.selected()?;
        self.visible_rows().into_iter().nth(index)
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_rows().len();
        let selected = match (count, self.table_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (n, Some(i)) => Some(i.min(n - 1)),
        };
        self.table_state.select(selected);
    }

    /// Applies `substring` as the table filter.
    pub fn on_filter_applied(&mut self, substring: &str) {
        self.filter = substring.to_string();
        self.table_state.select(None);
        self.clamp_selection();
        let shown = self.visible_rows().len();
        self.status = if substring.is_empty() {
            Status::Info("filter cleared".to_string())
        } else {
            Status::Info(format!("{shown} rows match {substring:?}"))
        };
    }

    /// Opens the detail view of `id`.
    pub fn on_select(&mut self, id: EntryId) {
        let Some(entry) = self.engine.catalog().get(id) else {
            self.status = Status::Error(format!("entry #{id} is gone"));
            return;
        };
        self.preview = preview_for(&entry.display_name, &entry.storage_path);
        self.view = View::Detail(id);
    }

    /// Restores `id` to its original location.
    ///
    /// A failure only changes the status line; the current view stays.
    pub fn restore(&mut self, id: EntryId) {
        match self.engine.restore(id, None) {
            Ok(restored) => {
                let mut message = format!(
                    "restored {} -> {}",
                    restored.entry.display_name,
                    restored.destination.display()
                );
                for warning in &restored.report.warnings {
                    message.push_str(&format!(" (warning: {warning})"));
                }
                self.status = Status::Info(message);
                self.view = View::Table;
                self.preview = None;
                self.clamp_selection();
            }
            Err(err) => {
                self.status = Status::Error(format!("restore failed [{}]: {err}", err.kind()));
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match (self.view, self.mode) {
            (View::Detail(_), _) => self.handle_detail_key(key),
            (View::Table, InputMode::Filter) => self.handle_filter_key(key),
            (View::Table, InputMode::Normal) => self.handle_table_key(key),
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-(PAGE as isize)),
            KeyCode::PageDown => self.move_selection(PAGE as isize),
            KeyCode::Char('g') | KeyCode::Home => self.table_state.select(Some(0)),
            KeyCode::Char('G') | KeyCode::End => {
                self.table_state.select(Some(usize::MAX));
            }
            KeyCode::Char('/') => {
                self.mode = InputMode::Filter;
                self.input = self.filter.clone();
            }
            KeyCode::Enter => {
                if let Some(row) = self.selected_row() {
                    self.on_select(row.id);
                }
            }
            KeyCode::Char('U') => {
                if let Some(row) = self.selected_row() {
                    self.restore(row.id);
                }
            }
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let input = std::mem::take(&mut self.input);
                self.on_filter_applied(&input);
            }
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.input.clear();
                self.clamp_selection();
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.clamp_selection();
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.view = View::Table;
                self.preview = None;
            }
            KeyCode::Char('U') => {
                if let View::Detail(id) = self.view {
                    self.restore(id);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.scroll_preview(-1),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_preview(1),
            KeyCode::PageUp => self.scroll_preview(-(PAGE as i32)),
            KeyCode::PageDown => self.scroll_preview(PAGE as i32),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta);
        self.table_state.select(Some(next));
    }

    fn scroll_preview(&mut self, delta: i32) {
        if let Some(preview) = &mut self.preview {
            let lines = preview.text.lines().count().min(u16::MAX as usize) as i32;
            let next = (preview.scroll as i32 + delta).clamp(0, lines.saturating_sub(1).max(0));
            preview.scroll = next as u16;
        }
    }
}

fn is_text_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn preview_for(display_name: &str, storage_path: &Path) -> Option<Preview> {
    if !is_text_name(display_name) {
        return None;
    }
    let text = match RealFileSystem.read_prefix(storage_path, PREVIEW_LIMIT) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => format!("Error reading file: {err}"),
    };
    Some(Preview { text, scroll: 0 })
}
