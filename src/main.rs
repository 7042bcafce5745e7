use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    fs::{File, OpenOptions},
    io::{self, stdin, Write},
    path::PathBuf,
};

use pullups::{
    app::{App, Screen},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::{export_csv, HistoryStore, HistorySummary},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{SessionConfig, SessionTracker},
    store::SqliteStore,
    ui::screen::current_screen,
};

/// terminal pull-up counter with rest timers and a training history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Log pull-up sets as you go, watch workout and rest time, undo/redo mistakes, and keep a local history of finished sessions."
)]
pub struct Cli {
    /// path of the history database
    #[clap(long)]
    db: Option<PathBuf>,

    /// path of the JSON config file
    #[clap(long)]
    config: Option<PathBuf>,

    /// input lockout after each logged set, in milliseconds
    #[clap(long)]
    cooldown_ms: Option<u64>,

    /// maximum number of undo steps kept per session (at least 1)
    #[clap(long, value_parser = parse_undo_depth)]
    undo_depth: Option<usize>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// print stored sessions and a summary
    History {
        /// print the stored JSON list instead of a table
        #[clap(long)]
        json: bool,
    },
    /// write stored sessions to a CSV file
    Export {
        /// destination file
        path: PathBuf,
    },
    /// show the config file location and the effective settings
    Config {
        /// save the effective settings, command line overrides included
        #[clap(long)]
        write: bool,
    },
}

fn parse_undo_depth(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("undo depth must be at least 1".to_string()),
        Ok(depth) => Ok(depth),
        Err(e) => Err(e.to_string()),
    }
}

/// Config file values with command line overrides applied
fn merge_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(ms) = cli.cooldown_ms {
        config.cooldown_ms = ms;
    }
    if cli.undo_depth.is_some() {
        config.undo_depth = cli.undo_depth;
    }
    if cli.db.is_some() {
        config.db_path = cli.db.clone();
    }
    config
}

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    session: SessionConfig,
    db_path: PathBuf,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Self {
        let config = merge_config(cli, config);
        let db_path = config
            .db_path
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("pullups_history.db"));

        Self {
            session: SessionConfig::from(&config),
            db_path,
        }
    }
}

fn open_log_file() -> Option<File> {
    let path = AppDirs::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn init_logging() {
    // The TUI owns the terminal, so logs only ever go to a file
    let Some(log_file) = open_log_file() else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PULLUPS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load();

    if let Some(Command::Config { write }) = &cli.command {
        return show_config(&config_store, merge_config(&cli, config), *write, &mut io::stdout());
    }

    let settings = Settings::resolve(&cli, config);
    tracing::debug!(?settings, "resolved settings");

    let kv = SqliteStore::open(&settings.db_path)
        .with_context(|| format!("opening history at {}", settings.db_path.display()))?;
    let store = HistoryStore::new(Box::new(kv));

    match &cli.command {
        None => run_tui_mode(settings, store),
        Some(Command::History { json }) => print_history(&store, *json, &mut io::stdout()),
        Some(Command::Export { path }) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            export_csv(&store.load_all(), file)?;
            tracing::info!(path = %path.display(), "history exported");
            Ok(())
        }
        Some(Command::Config { .. }) => Ok(()),
    }
}

fn show_config<W: Write>(
    store: &FileConfigStore,
    config: Config,
    write: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    if write {
        store
            .save(&config)
            .with_context(|| format!("writing {}", store.path().display()))?;
        tracing::info!(path = %store.path().display(), "config saved");
    }
    writeln!(out, "{}", store.path().display())?;
    writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
    Ok(())
}

fn print_history<W: Write>(store: &HistoryStore, json: bool, out: &mut W) -> anyhow::Result<()> {
    let records = store.load_all();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
        return Ok(());
    }

    if records.is_empty() {
        writeln!(out, "No sessions recorded yet.")?;
        return Ok(());
    }

    for record in &records {
        writeln!(
            out,
            "{}  pull-ups: {:>4}  time: {}",
            record.local_date_label(),
            record.pullups,
            record.time
        )?;
    }

    let summary = HistorySummary::from_records(&records);
    writeln!(
        out,
        "\n{} sessions, {} pull-ups total",
        summary.sessions, summary.total_pullups
    )?;
    if let Some(best) = summary.best {
        writeln!(out, "best: {} on {}", best.pullups, best.local_date_label())?;
    }
    Ok(())
}

fn run_tui_mode(settings: Settings, store: HistoryStore) -> anyhow::Result<()> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(SessionTracker::new(settings.session), store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    tracing::info!(screen = %Screen::Counter, "tui started");

    terminal.draw(|f| ui(app, f))?;

    while !app.should_quit() {
        let redraw = match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => true,
            AppEvent::Key(key) => {
                app.on_key(key);
                true
            }
        };

        if redraw && !app.should_quit() {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(app.screen).render(app, f);
}
