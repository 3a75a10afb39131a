use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use paceline::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, StorageBackend},
    export::{session_export_filename, to_csv, DirExportSink, ExportSink},
    feedback::BellFeedback,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TimerEvent},
    session::SessionStore,
    storage::open_repository,
    timer::LapTimer,
    util::format_time,
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// lap timer tui with goal pacing, session history and csv export
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal lap timer for interval training. Set a goal lap time and tolerance, record laps, see each lap rated on pace, fast or slow, and keep a history of sessions you can export as CSV."
)]
pub struct Cli {
    /// goal lap time in seconds (0 disables goal tracking)
    #[clap(short = 'g', long)]
    goal: Option<f64>,

    /// allowed deviation from the goal in seconds
    #[clap(short = 't', long)]
    tolerance: Option<f64>,

    /// where to keep saved sessions
    #[clap(long, value_enum)]
    storage: Option<StorageBackend>,

    /// directory holding the session archive
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// directory csv exports are written to
    #[clap(long)]
    export_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// list saved sessions
    Sessions,
    /// write a saved session as csv
    Export {
        /// session number as shown by `sessions`
        index: usize,

        /// output file (defaults to the export directory)
        #[clap(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    /// Stored config with command line overrides applied
    fn effective_config(&self, stored: &Config) -> Config {
        let mut config = stored.clone();
        if let Some(goal) = self.goal {
            config.goal_secs = goal;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance_secs = tolerance;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }
        config
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    let path = AppDirs::log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PACELINE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("paceline=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

fn open_store(config: &Config) -> Result<SessionStore, Box<dyn Error>> {
    let path = AppDirs::sessions_path(config.data_dir.clone(), config.storage);
    info!(storage = %config.storage, path = %path.display(), "opening session archive");
    Ok(SessionStore::load(open_repository(config.storage, &path)?))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // the log file is a convenience; the timer runs without it
    let _ = init_logging();

    let config_store = FileConfigStore::new();
    let stored = config_store.load();
    let config = cli.effective_config(&stored);
    info!(
        goal_secs = config.goal_secs,
        tolerance_secs = config.tolerance_secs,
        "paceline starting"
    );

    match &cli.command {
        Some(Command::Sessions) => return list_sessions(&config),
        Some(Command::Export { index, out }) => return export_session(&config, *index, out),
        None => {}
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = open_store(&config)?;
    let timer = LapTimer::new(config.goal()).with_feedback(Box::new(BellFeedback::stdout()));
    let sink = DirExportSink::new(AppDirs::export_dir(config.export_dir.clone()));
    info!(dir = %sink.dir().display(), "exports directory");
    let mut app =
        App::new(stored, timer, store, Box::new(sink)).with_config_store(Box::new(config_store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TimerEvent::Tick => {
                // only a running timer changes the screen between key presses
                if app.timer.is_running() {
                    app.on_tick();
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            TimerEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            TimerEvent::Key(key) => {
                if app.handle_key(key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    info!("paceline exiting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

fn list_sessions(config: &Config) -> Result<(), Box<dyn Error>> {
    let store = open_store(config)?;
    if store.is_empty() {
        println!("no saved sessions");
        return Ok(());
    }

    for (i, session) in store.sessions().iter().enumerate() {
        println!(
            "{:>3}. {} ({}) - {} laps, Avg: {}",
            i + 1,
            session.display_name(),
            session.date,
            session.laps.len(),
            format_time(session.summary.avg as i64)
        );
    }
    Ok(())
}

fn export_session(
    config: &Config,
    index: usize,
    out: &Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(config)?;
    let Some(session) = index.checked_sub(1).and_then(|i| store.get(i)) else {
        return Err(format!("no saved session #{index} ({} saved)", store.len()).into());
    };

    let content = to_csv(&session.laps, config.goal());
    let path = match out {
        Some(path) => {
            fs::write(path, &content)?;
            path.clone()
        }
        None => DirExportSink::new(AppDirs::export_dir(config.export_dir.clone()))
            .write_file(&session_export_filename(session), &content)?,
    };
    info!(path = %path.display(), "session exported");
    println!("{}", path.display());

    Ok(())
}
