use anyhow::Result;
use manual_intelligence::{
    handler, logging, tui, ui, App, Config, EventHandler, ManualsClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e:#}");
        Config::from_env()
    });

    // Keep the guard for the whole run; dropping it stops file logging
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("File logging disabled: {e}");
            None
        }
    };
    tracing::info!(base_url = %config.base_url, "starting");

    let client = ManualsClient::new(&config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(client, events.sender());
    app.load_products();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
