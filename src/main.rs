//! Keyshelf TUI - Terminal User Interface for the Keyshelf key manager
//!
//! A Ratatui-based TUI for browsing, reordering, moving and copying API keys
//! stored on a Keyshelf server, driven by keyboard and mouse drag and drop.

mod actions;
mod api;
mod app;
mod config;
mod dnd;
mod state;
mod sync;
mod ui;

use anyhow::Result;
use app::App;
use config::ClientConfig;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "keyshelf-tui.log";

/// Log to a file so output does not tear the alternate screen; stderr if
/// the data directory is unavailable
fn log_writer() -> (BoxMakeWriter, bool) {
    let file = ClientConfig::log_dir().and_then(|dir| {
        fs::create_dir_all(&dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
            .ok()
    });
    match file {
        Some(file) => (BoxMakeWriter::new(Mutex::new(file)), true),
        None => (BoxMakeWriter::new(io::stderr), false),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let (writer, to_file) = log_writer();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyshelf_tui=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(!to_file),
        )
        .init();

    // Create the app before taking over the terminal so startup failures print normally
    let mut app = App::new().await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = app.save_config() {
        tracing::warn!("Failed to save config: {e}");
    }

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        let term_size = terminal.size()?;
        app.terminal_size = Some((term_size.height, term_size.width));
        app.tick();

        // Draw the UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Faster polling while a drag or flash is on screen (16ms = ~60fps)
        let poll_duration = if app.is_animating() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_duration)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key).await?;
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse).await?;
                }
                // Layout is recomputed from the terminal size on the next draw
                _ => {}
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
