//! Rendering of the table and detail views.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table, Wrap},
    Frame,
};

use super::app::{Browser, InputMode, Status, View};
use crate::catalog::Row;
use crate::helpers::print_size;

const COLUMN_WIDTHS: [Constraint; 5] = [
    Constraint::Length(5),
    Constraint::Length(24),
    Constraint::Length(10),
    Constraint::Length(26),
    Constraint::Min(20),
];

pub fn draw(frame: &mut Frame, browser: &mut Browser) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(5),    // body
            Constraint::Length(1), // filter / key hints
            Constraint::Length(1), // status
        ])
        .split(frame.area());

    let title = match browser.view {
        View::Table => " TrashBox Viewer ",
        View::Detail(_) => " Detail Viewer ",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(title, browser.style.title))),
        chunks[0],
    );

    match browser.view {
        View::Table => draw_table(frame, chunks[1], browser),
        View::Detail(_) => draw_detail(frame, chunks[1], browser),
    }

    draw_hints(frame, chunks[2], browser);
    draw_status(frame, chunks[3], browser);
}

fn draw_table(frame: &mut Frame, area: Rect, browser: &mut Browser) {
    let rows = browser.visible_rows();
    let style = browser.style;

    let header = TableRow::new(Row::HEADERS.iter().map(|h| Cell::from(*h))).style(style.header);
    let body = rows.iter().map(|row| TableRow::new(row.columns().map(Cell::from)));

    let table = Table::new(body, COLUMN_WIDTHS)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style.border)
                .title(format!(" {} / {} ", rows.len(), browser.engine().catalog().len())),
        )
        .row_highlight_style(style.selected);

    frame.render_stateful_widget(table, area, &mut browser.table_state);
}

fn draw_detail(frame: &mut Frame, area: Rect, browser: &Browser) {
    let View::Detail(id) = browser.view else {
        return;
    };
    let style = browser.style;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let lines: Vec<Line> = match browser.engine().catalog().get(id) {
        Some(entry) => {
            let fields = [
                ("#", entry.id.to_string()),
                ("Name", entry.display_name.clone()),
                ("Size", format!("{} ({})", entry.size_bytes, print_size(entry.size_bytes))),
                ("Date Deleted", entry.deleted_at_rfc3339()),
                ("Location", entry.original_path.display().to_string()),
                ("InTrashBox", entry.storage_path.display().to_string()),
            ];
            fields
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<14}: "), style.header),
                        Span::raw(value),
                    ])
                })
                .collect()
        }
        None => vec![Line::from(Span::styled("entry no longer in trash", style.error))],
    };
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some(preview) = &browser.preview {
        let content = Paragraph::new(preview.text.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style.border)
                    .title(" Content "),
            )
            .wrap(Wrap { trim: false })
            .scroll((preview.scroll, 0));
        frame.render_widget(content, chunks[1]);
    }
}

fn draw_hints(frame: &mut Frame, area: Rect, browser: &Browser) {
    let style = browser.style;
    let line = match (browser.view, browser.mode) {
        (View::Table, InputMode::Filter) => Line::from(vec![
            Span::styled("Filter: ", style.header),
            Span::raw(browser.input.as_str()),
            Span::styled("   [Enter] apply  [Esc] cancel", style.hint),
        ]),
        (View::Table, InputMode::Normal) => Line::from(Span::styled(
            "[/] filter  [Enter] details  [U] undelete  [Esc] quit",
            style.hint,
        )),
        (View::Detail(_), _) => Line::from(Span::styled(
            "[j/k] scroll  [U] undelete  [Esc] back",
            style.hint,
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_status(frame: &mut Frame, area: Rect, browser: &Browser) {
    let line = match &browser.status {
        Status::Info(message) => Line::from(message.as_str()),
        Status::Error(message) => Line::from(Span::styled(message.as_str(), browser.style.error)),
    };
    frame.render_widget(Paragraph::new(line), area);
}
