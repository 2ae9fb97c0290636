// Application state and orchestration logic.
//
// The central event loop that coordinates chat events from the
// Streamer.bot client with user commands from the TUI. Owns the round
// session and pushes board/status projections to the TUI render loop
// after every state change.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::client::ClientEvent;
use crate::config::Config;
use crate::game::board;
use crate::game::session::{ChatOutcome, RoundSession};
use crate::protocol::{ConnectionStatus, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub session: RoundSession,
    pub connection_status: ConnectionStatus,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let session = RoundSession::new(config.chat.moderator_level);
        AppState {
            config,
            session,
            connection_status: ConnectionStatus::Disconnected,
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until the TUI quits or the client
/// channel closes.
pub async fn run(
    mut client_rx: mpsc::Receiver<ClientEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    // Initial push so the TUI shows "Closed" and an empty board before the
    // first event arrives.
    push_round_status(&state, &ui_tx).await;
    push_board(&state, &ui_tx).await;

    loop {
        tokio::select! {
            event = client_rx.recv() => {
                match event {
                    Some(event) => handle_client_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("client channel closed, stopping app loop");
                        break;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) | None => {
                        info!("quit requested, stopping app loop");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Apply one client event to the state and push the resulting UI updates.
pub async fn handle_client_event(
    state: &mut AppState,
    event: ClientEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        ClientEvent::Connected => {
            state.connection_status = ConnectionStatus::Connected;
            let _ = ui_tx
                .send(UiUpdate::ConnectionStatus(ConnectionStatus::Connected))
                .await;
        }
        ClientEvent::Disconnected => {
            state.connection_status = ConnectionStatus::Disconnected;
            let _ = ui_tx
                .send(UiUpdate::ConnectionStatus(ConnectionStatus::Disconnected))
                .await;
        }
        ClientEvent::Chat(chat) => {
            let shown_name = chat.shown_name().to_string();
            let outcome =
                state
                    .session
                    .handle_chat(&chat.username, &shown_name, chat.role, &chat.message);
            debug!(username = %chat.username, ?outcome, "chat message handled");

            match outcome {
                ChatOutcome::Ignored => {}
                ChatOutcome::StatusChanged => push_round_status(state, ui_tx).await,
                ChatOutcome::BoardChanged => push_board(state, ui_tx).await,
                ChatOutcome::PriceSet { .. } => push_board(state, ui_tx).await,
            }
        }
    }
}

async fn push_round_status(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::RoundStatus {
            accepting: state.session.is_accepting(),
            opened_at: state.session.opened_at(),
        })
        .await;
}

async fn push_board(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let entries = board::project(state.session.guesses(), state.session.highlight());
    let _ = ui_tx.send(UiUpdate::Board(entries)).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
