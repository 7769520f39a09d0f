//! Trellol - Terminal Kanban Board
//!
//! A single-board kanban tracker for the terminal. Cards live in three fixed
//! columns, can be added, deleted and dragged around with the mouse, and the
//! board is saved after every change.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use trellol::application::App;
use trellol::infrastructure::{default_log_file, resolve_data_dir, BoardRepository, FileStore};
use trellol::presentation::{render_ui, InputHandler};

#[derive(Parser, Debug)]
#[command(name = "trellol", version, about = "Single-board kanban tracker for the terminal")]
struct Cli {
    /// Directory holding the saved board (defaults to the system data directory)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log file (defaults to trellol.log inside the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Discard the saved board and start again from the demo board
    #[arg(long)]
    reset: bool,
}

/// Entry point for the trellol terminal kanban board.
///
/// Resolves where the board is stored, sets up logging and the terminal,
/// and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved, the saved
/// board cannot be reset, or terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    let log_file = cli.log_file.unwrap_or_else(|| default_log_file(&data_dir));
    init_logging(&log_file);
    tracing::info!("Using data directory {}", data_dir.display());

    let mut repository = BoardRepository::new(FileStore::new(&data_dir));
    if cli.reset {
        repository.clear()?;
        tracing::info!("Saved board discarded");
    }
    let mut app = App::new(repository);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Event loop failed: {}", err);
        println!("{err:?}");
    }

    Ok(())
}

/// Sends logs to a file, since the terminal belongs to the UI. `RUST_LOG`
/// overrides the default `trellol=info` filter.
fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trellol=info"));

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        eprintln!("Warning: Could not create log directory: {}", e);
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not open log file {}: {}. Logging disabled.",
                path.display(),
                e
            );
        }
    }
}

/// Main application event loop.
///
/// Every iteration renders a fresh frame from the board, then handles one
/// terminal event against the geometry of that frame.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
            Event::Mouse(mouse) => InputHandler::handle_mouse_event(app, mouse),
            Event::FocusLost => InputHandler::handle_focus_lost(app),
            _ => {}
        }

        if app.should_quit {
            tracing::info!("Quitting");
            return Ok(());
        }
    }
}
