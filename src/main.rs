mod app;
mod apply;
mod commands;
mod config;
mod device;
mod error;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::Duration;

use app::App;
use commands::Xinput;
use config::Config;

const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Adjust mouse and touchpad pointer speed via xinput (Xorg only).
///
/// Profiles are saved per device id or name and re-applied automatically
/// shortly after startup.
#[derive(Parser, Debug)]
#[command(name = "xinput-tui")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Apply all saved profiles to connected devices and exit
    #[arg(long)]
    apply: bool,

    /// List detected pointer devices and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), error::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config_path = Config::resolve_path(&cli.config)?;
    let config = Config::load(&config_path);
    let backend = Xinput;

    if cli.list {
        for dev in device::scan(&backend) {
            println!("{}  (id {})", dev.name, dev.id);
        }
        return Ok(());
    }

    if cli.apply {
        let devices = device::scan(&backend);
        apply::apply_all(&backend, &devices, &config);
        return Ok(());
    }

    let app = App::new(config, config_path);
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, app);
    restore_terminal()?;
    result.map_err(Into::into)
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(stdout()))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if event::poll(TICK_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                    break;
                }
            }
        }

        app.tick();
    }

    Ok(())
}
