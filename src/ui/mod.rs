pub mod app;
pub mod render;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

pub use app::{Action, App};

use crate::config::Config;
use crate::error::Result;
use crate::report::{generate_report, ReportAssembler};

/// Take over the terminal, run the event loop and restore the terminal on exit.
pub async fn run(cfg: &Config, app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, cfg, app).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &Config,
    app: &mut App,
) -> Result<()> {
    let poll_interval = Duration::from_millis(250);

    loop {
        terminal.draw(|f| render::render(f, app))?;

        if !event::poll(poll_interval)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::None => {}
            Action::Quit => {
                info!("Quit requested");
                return Ok(());
            }
            Action::Generate(output) => {
                // Draw the "Generating" overlay before blocking on the worker.
                terminal.draw(|f| render::render(f, app))?;
                let data = app.report_data();
                info!(
                    output = %output.display(),
                    markets = data.markets.len(),
                    "Generating report",
                );
                let outcome = generate_report(
                    ReportAssembler::new(cfg.image_width_emu()),
                    cfg.template_path.clone(),
                    output,
                    data,
                )
                .await;
                app.finish_generation(outcome);
            }
        }
    }
}
