// TUI overlay: layout, input handling, and rendering.
//
// The TUI owns a `ViewState` that mirrors relevant parts of the
// application state. The app orchestrator pushes `UiUpdate` messages over
// an mpsc channel; the TUI applies them to `ViewState` and re-renders at
// ~30 fps.

pub mod layout;

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream, KeyCode, KeyModifiers};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::game::board::BoardEntry;
use crate::protocol::{ConnectionStatus, UiUpdate, UserCommand};

use layout::{build_layout, AppLayout};

/// How long the "Connected" banner stays spelled out in the status bar
/// before collapsing to the quiet indicator dot.
const CONNECTED_BANNER_DURATION: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app
/// orchestrator. The `render_frame` function reads this struct to draw
/// the overlay.
pub struct ViewState {
    /// Current board rows, already sorted and formatted.
    pub entries: Vec<BoardEntry>,
    /// Whether the round is accepting guesses.
    pub accepting: bool,
    /// When the round was opened, if it is open.
    pub opened_at: Option<DateTime<Local>>,
    /// WebSocket connection status.
    pub connection_status: ConnectionStatus,
    /// When the connection last came up; drives the temporary banner.
    pub connected_at: Option<Instant>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            entries: Vec::new(),
            accepting: false,
            opened_at: None,
            connection_status: ConnectionStatus::Disconnected,
            connected_at: None,
        }
    }
}

impl ViewState {
    /// Whether the spelled-out "Connected" banner should still be shown.
    pub fn connected_banner_visible(&self, now: Instant) -> bool {
        match (self.connection_status, self.connected_at) {
            (ConnectionStatus::Connected, Some(at)) => {
                now.duration_since(at) < CONNECTED_BANNER_DURATION
            }
            _ => false,
        }
    }
}

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Board(entries) => {
            state.entries = entries;
        }
        UiUpdate::RoundStatus {
            accepting,
            opened_at,
        } => {
            state.accepting = accepting;
            state.opened_at = opened_at;
        }
        UiUpdate::ConnectionStatus(status) => {
            state.connection_status = status;
            state.connected_at = match status {
                ConnectionStatus::Connected => Some(Instant::now()),
                ConnectionStatus::Disconnected => None,
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the complete overlay frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    render_status_bar(frame, &layout, state);
    render_board(frame, &layout, state);
    render_help_bar(frame, &layout);
}

fn render_status_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let mut spans = Vec::new();

    // Connection indicator
    let (dot, dot_color) = connection_indicator(state.connection_status);
    spans.push(Span::styled(
        format!(" {dot} "),
        Style::default().fg(dot_color),
    ));
    match state.connection_status {
        ConnectionStatus::Connected => {
            if state.connected_banner_visible(Instant::now()) {
                spans.push(Span::styled(
                    "Connected",
                    Style::default().fg(Color::Green),
                ));
                spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
            }
        }
        ConnectionStatus::Disconnected => {
            spans.push(Span::styled(
                "Disconnected",
                Style::default().fg(Color::Red),
            ));
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        }
    }

    // Round status
    spans.extend(round_status_spans(state));

    // Guess count
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("{} guesses", state.entries.len()),
        Style::default().fg(Color::White),
    ));

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.status_bar);
}

/// Return the connection dot character and its color.
fn connection_indicator(status: ConnectionStatus) -> (&'static str, Color) {
    match status {
        ConnectionStatus::Connected => ("●", Color::Green),
        ConnectionStatus::Disconnected => ("●", Color::Red),
    }
}

/// Build the "Guessing: Open/Closed" spans for the status bar.
fn round_status_spans(state: &ViewState) -> Vec<Span<'static>> {
    if state.accepting {
        let since = state
            .opened_at
            .map(|at| format!(" since {}", at.format("%H:%M:%S")))
            .unwrap_or_default();
        vec![Span::styled(
            format!("Guessing: Open{since}"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )]
    } else {
        vec![Span::styled(
            "Guessing: Closed",
            Style::default().fg(Color::White),
        )]
    }
}

fn render_board(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let lines: Vec<Line> = if state.entries.is_empty() {
        vec![Line::from(Span::styled(
            "No guesses yet",
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ))]
    } else {
        state.entries.iter().map(board_line).collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Price Guesses"),
    );
    frame.render_widget(paragraph, layout.board);
}

/// Render one board row; the winner gets a highlight style and marker.
fn board_line(entry: &BoardEntry) -> Line<'static> {
    let text = format!(
        " {:<24} ${:>12}",
        entry.display_name, entry.formatted_price
    );
    if entry.is_winner {
        Line::from(vec![
            Span::styled(
                text,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  ◀ closest", Style::default().fg(Color::Yellow)),
        ])
    } else {
        Line::from(Span::styled(text, Style::default().fg(Color::White)))
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text = " q:Quit | commands in chat: !openprice !closeprice !clearprice !setprice <price>";
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal on panic; chain the original hook after ours.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update);
                    }
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        let ctrl_c = key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(KeyModifiers::CONTROL);
                        if ctrl_c || key_event.code == KeyCode::Char('q') {
                            let _ = cmd_tx.send(UserCommand::Quit).await;
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse events, resize events, etc. -- ignore
                    }
                    Some(Err(_)) | None => {
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
