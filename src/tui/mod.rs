//! Interactive terminal front end.
//!
//! One task owns all state. Key presses arrive from a reader thread,
//! finished requests from spawned tasks, and due playback steps are fired
//! between events; every source funnels into the same loop.

pub mod app;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use app::{App, Command, Response};

use crate::api::{ApiClient, MountainApi};
use crate::config::Settings;
use crate::services::Session;

/// Longest the loop sleeps without redrawing; keeps tab flashes short.
const IDLE_REDRAW: Duration = Duration::from_millis(100);
const INPUT_POLL: Duration = Duration::from_millis(250);

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the terminal UI until the user quits.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let client = ApiClient::with_user_agent(
        &settings.base_url,
        settings.timeout(),
        settings.user_agent.as_deref(),
    )?;
    let api: Arc<dyn MountainApi> = Arc::new(client);
    let session = Session::new(settings, Local::now().date_naive())?;
    let mut app = App::new(session, settings.weather_output.clone());

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, api).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(terminal: &mut Term, app: &mut App, api: Arc<dyn MountainApi>) -> anyhow::Result<()> {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    spawn_input_reader(input_tx);
    let (response_tx, mut response_rx) = mpsc::unbounded_channel();

    dispatch(&api, Command::FetchCatalog, &response_tx);

    loop {
        let now = Instant::now();
        app.tick(now);
        terminal.draw(|frame| view::draw(frame, app, now))?;
        if app.should_quit() {
            info!("quitting");
            return Ok(());
        }

        let wait = app.scheduler().timeout(now, IDLE_REDRAW);
        tokio::select! {
            Some(event) = input_rx.recv() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        if let Some(command) = app.handle_key(key, Instant::now()) {
                            dispatch(&api, command, &response_tx);
                        }
                    }
                }
            }
            Some(response) = response_rx.recv() => app.on_response(response),
            _ = tokio::time::sleep(wait) => {}
        }
    }
}

/// Start a request. Earlier requests are neither queued behind nor
/// cancelled; whichever response lands last is what the user sees.
fn dispatch(api: &Arc<dyn MountainApi>, command: Command, tx: &mpsc::UnboundedSender<Response>) {
    debug!("dispatching {:?}", command);
    let api = Arc::clone(api);
    let tx = tx.clone();
    tokio::spawn(async move {
        let response = match command {
            Command::FetchCatalog => Response::Catalog(api.catalog().await),
            Command::FetchScrapes(query) => Response::Scrapes(api.scrapes(&query).await),
            Command::FetchWeather(query) => Response::Weather(api.weather(&query).await),
        };
        // The loop is gone once the user quit.
        let _ = tx.send(response);
    });
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>) {
    std::thread::spawn(move || loop {
        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("terminal input failed: {}", e);
                    break;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                warn!("terminal input failed: {}", e);
                break;
            }
        }
    });
}
