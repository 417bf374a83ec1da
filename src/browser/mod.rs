//! Interactive trash browser powered by ratatui.
//!
//! The browser owns the engine for the whole session. Every restore runs on
//! the event loop thread and blocks it until the filesystem call returns.

mod app;
mod ui;

pub use app::{Browser, BrowserStyle, InputMode, Preview, Status, View};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::time::Duration;
use tracing::debug;

use crate::engine::TrashEngine;

/// Runs the browser until the user quits.
pub fn run(engine: TrashEngine, style: BrowserStyle) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut browser = Browser::new(engine, style);
    let result = run_event_loop(&mut terminal, &mut browser);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop<B: Backend>(terminal: &mut Terminal<B>, browser: &mut Browser) -> io::Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, browser))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    browser.on_key(key);
                }
            }
        }

        if browser.should_quit {
            debug!("browser closed");
            break;
        }
    }

    Ok(())
}
