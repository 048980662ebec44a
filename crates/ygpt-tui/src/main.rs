use anyhow::{Context, Result};
use ygpt_core::Config;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init()?;
    tracing::info!(log = %log_path.display(), "Ygpt v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("loading config")?;
    let mut app = App::new(config).context("invalid config")?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let tx = events.sender();

    let result = run(&mut terminal, &mut app, &mut events, &tx).await;

    tui::restore()?;
    tracing::info!("Shutting down");
    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut EventHandler,
    tx: &tokio::sync::mpsc::UnboundedSender<tui::AppEvent>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event, tx)?,
            None => break,
        }
    }
    Ok(())
}
