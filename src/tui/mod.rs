// TUI module - terminal user interface
//
// Manages terminal setup/teardown, the event loop, and rendering. The loop
// multiplexes keyboard input, timer ticks, settled network replies, and
// connectivity snapshots with tokio::select!; all state mutation happens on
// this task, so the App needs no locking.

pub mod app;
pub mod clipboard;
pub mod components;
pub mod markdown;
pub mod views;

use crate::api::ApiClient;
use crate::config::Config;
use crate::connectivity::ConnectivityState;
use crate::events::AppEvent;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, View};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};

/// Run the TUI until the user quits
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// the way out even when the loop errors.
pub async fn run_tui(
    config: &Config,
    client: Arc<ApiClient>,
    conn_rx: watch::Receiver<ConnectivityState>,
    reprobe: Arc<Notify>,
    log_buffer: LogBuffer,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(config, log_buffer);
    let result = run_event_loop(&mut terminal, &mut app, client, conn_rx, reprobe).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Four event sources feed one select!: keyboard input (polled so the task
/// never blocks the runtime), a periodic tick for animation, settled reply
/// events from spawned send tasks, and connectivity snapshots from the
/// watcher. After each iteration the parked dispatch and re-probe requests
/// are drained into background work.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: Arc<ApiClient>,
    mut conn_rx: watch::Receiver<ConnectivityState>,
    reprobe: Arc<Notify>,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    app.connectivity = conn_rx.borrow().clone();

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            // Periodic tick for spinner animation and toast expiry
            _ = tick_interval.tick() => {
                app.tick();
            }

            // A dispatched message settled
            Some(app_event) = event_rx.recv() => {
                app.handle_app_event(app_event);
            }

            // Connectivity snapshot changed
            Ok(()) = conn_rx.changed() => {
                app.connectivity = conn_rx.borrow_and_update().clone();
            }
        }

        // Drain work parked by key handling
        if let Some(out) = app.pending_dispatch.take() {
            let client = client.clone();
            let tx = event_tx.clone();
            tokio::spawn(async move {
                let result = client.send(out.topic, &out.text).await;
                let _ = tx
                    .send(AppEvent::Reply {
                        topic: out.topic,
                        generation: out.generation,
                        result,
                    })
                    .await;
            });
        }
        if std::mem::take(&mut app.probe_requested) {
            reprobe.notify_one();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
///
/// Layered dispatch: global keys first, then the current view.
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if handle_global_keys(app, &key_event) {
        return;
    }

    match app.view {
        View::Catalog => handle_catalog_keys(app, &key_event),
        View::Chat => handle_chat_keys(app, &key_event),
    }
}

/// Keys that work the same in every view
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            true
        }
        KeyCode::F(12) => {
            app.show_logs = !app.show_logs;
            true
        }
        _ => false,
    }
}

fn handle_catalog_keys(app: &mut App, key_event: &KeyEvent) {
    match key_event.code {
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Tab => app.cycle_category(false),
        KeyCode::BackTab => app.cycle_category(true),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Esc => {
            // First Esc clears the search, second quits
            if app.catalog.search.is_empty() {
                app.should_quit = true;
            } else {
                app.catalog.search.clear();
                app.catalog.selected = 0;
            }
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_search_char(c);
        }
        _ => {}
    }
}

fn handle_chat_keys(app: &mut App, key_event: &KeyEvent) {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Esc => {
            // First Esc dismisses the error banner, second leaves the chat
            if !app.dismiss_error() {
                app.back_to_catalog();
            }
        }
        KeyCode::Char('l') if ctrl => app.clear_chat(),
        KeyCode::Char('r') if ctrl => {
            app.probe_requested = true;
            app.show_toast("Rechecking server...");
        }
        KeyCode::Char('y') if ctrl => match app.copy_last_reply_text() {
            Some(text) => {
                if clipboard::copy_to_clipboard(&text).is_ok() {
                    app.show_toast("✓ Copied to clipboard");
                } else {
                    app.show_toast("✗ Failed to copy");
                }
            }
            None => app.show_toast("Nothing to copy yet"),
        },
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Char(c) if !ctrl => app.push_input_char(c),
        _ => {}
    }
}
