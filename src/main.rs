use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use todo_tui::api::TodoClient;
use todo_tui::app::App;
use todo_tui::config::{Cli, Config};
use todo_tui::{logging, ui};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    logging::init(config.log_file.as_deref())?;
    tracing::info!(api_url = %config.api_url, "starting");

    let client = TodoClient::new(&config.api_url, config.timeout)?;
    let app = App::new(client);

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let res = ui::run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
