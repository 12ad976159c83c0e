mod app;
mod creator;
mod error;
mod host;
mod model;
mod msg;
mod status;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::{App, Screen};
use creator::{Capabilities, MenuFileCreator};
use host::{CommandLauncher, Console, FixedTarget, FlagFileStatus};
use model::config::{self, AppConfig};
use msg::Msg;
use status::StatusWindow;

#[derive(Parser)]
#[command(name = "newfile")]
#[command(about = "New files from templates, right where you are", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a directory with the "New File" context menu (default)
    Browse {
        /// Directory to open instead of the configured start dir
        dir: Option<PathBuf>,
    },

    /// Show whether the menu integration is enabled
    Status,

    /// List the available templates
    Templates,

    /// Create a file from a template
    Create {
        /// Template index, as shown by `templates`
        index: usize,

        /// Target directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Open a terminal in a directory
    Terminal {
        /// Target directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Enable the menu integration
    Enable,

    /// Disable the menu integration
    Disable,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging to file (never stdout)
    let log_dir = config::data_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "newfile.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let default_filter = if cli.verbose { "newfile=debug" } else { "newfile=info" };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("newfile starting");

    let mut config = AppConfig::load()?;

    match cli.command.unwrap_or(Commands::Browse { dir: None }) {
        Commands::Browse { dir } => {
            if let Some(dir) = dir {
                config.general.start_dir = dir.to_string_lossy().to_string();
            }
            run_screen(|tx| App::new(config, tx))?;
        }
        Commands::Status => {
            let provider = FlagFileStatus::new(config.flag_file());
            run_screen(|_| Ok(StatusWindow::new(Box::new(provider))))?;
        }
        Commands::Templates => {
            for (index, template) in model::template::TemplateCatalog.templates().iter().enumerate() {
                println!(
                    "{index:>2}  {:<14} {}",
                    template.display_name,
                    template.target_file_name()
                );
            }
        }
        Commands::Create { index, dir } => {
            let creator = one_shot_creator(&config, dir)?;
            if creator.catalog().get(index).is_none() {
                bail!(
                    "no template at index {index} (0..{})",
                    creator.catalog().len()
                );
            }
            if creator.create_file_from_template(index).is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Terminal { dir } => {
            let creator = one_shot_creator(&config, dir)?;
            if creator.open_current_directory_in_terminal().is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Enable => FlagFileStatus::new(config.flag_file()).set_enabled(true)?,
        Commands::Disable => FlagFileStatus::new(config.flag_file()).set_enabled(false)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn one_shot_creator(config: &AppConfig, dir: Option<PathBuf>) -> Result<MenuFileCreator> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    Ok(MenuFileCreator::new(
        config.create.collision,
        Capabilities {
            target: Box::new(FixedTarget(Some(dir))),
            browser: Box::new(Console),
            alerts: Box::new(Console),
            terminal: Box::new(CommandLauncher::new(&config.terminal)),
        },
    ))
}

fn run_screen<S, F>(build: F) -> Result<()>
where
    S: Screen,
    F: FnOnce(mpsc::Sender<Msg>) -> Result<S>,
{
    let (tx, rx) = mpsc::channel::<Msg>();
    let mut screen = build(tx.clone())?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut screen, tx, rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("newfile error: {e:?}");
    }

    Ok(())
}

fn run<S: Screen>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &mut S,
    tx: mpsc::Sender<Msg>,
    rx: mpsc::Receiver<Msg>,
) -> Result<()> {
    // Input thread — reads terminal events and forwards as Msg
    let tx_input = tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event) = event::read() {
                let msg = match event {
                    Event::Key(k) => Msg::Key(k),
                    Event::Mouse(m) => Msg::Mouse(m),
                    Event::Resize(w, h) => Msg::Resize(w, h),
                    Event::FocusGained => Msg::Activated,
                    _ => continue,
                };
                if tx_input.send(msg).is_err() {
                    break;
                }
            }
        }
    });

    // Startup counts as the first activation.
    tx.send(Msg::Activated)?;

    // ── Main event loop ──
    loop {
        terminal.draw(|f| screen.view(f))?;

        // Batch-drain all pending messages
        let first = rx.recv()?;
        screen.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            screen.update(msg)?;
        }

        if screen.should_quit() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn defaults() -> AppConfig {
        AppConfig::from_layers(include_str!("../config/default.toml"), None).unwrap()
    }

    #[test]
    fn one_shot_creator_rejects_missing_directory() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("typo");

        let err = one_shot_creator(&defaults(), Some(missing.clone()))
            .err()
            .unwrap();
        assert!(err.to_string().contains(&missing.display().to_string()));
    }

    #[test]
    fn one_shot_creator_writes_into_given_directory() {
        let temp = tempdir().unwrap();
        let creator = one_shot_creator(&defaults(), Some(temp.path().to_path_buf())).unwrap();

        let path = creator.create_file_from_template(1).unwrap();
        assert_eq!(path, temp.path().join("New File.txt"));
    }
}
