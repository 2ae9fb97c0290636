// Integration tests for the priceboard overlay.
//
// These tests exercise the system end-to-end using the library crate's
// public API: raw Streamer.bot frames through the client's stream
// processor, chat events through the app orchestrator, and the resulting
// board projections.

use priceboard::app::{self, AppState};
use priceboard::client::{process_event_stream, ClientEvent};
use priceboard::config::Config;
use priceboard::game::board::{format_price, project};
use priceboard::game::session::{parse_price, RoundSession};
use priceboard::protocol::{
    parse_chat_event, ChatMessage, ConnectionStatus, UiUpdate, UserCommand,
};

use futures_util::stream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Build a raw Streamer.bot chat event frame.
fn chat_frame(username: &str, role: u8, message: &str) -> Message {
    let raw = serde_json::json!({
        "timeStamp": "2025-03-01T20:15:00.000-05:00",
        "event": { "source": "Twitch", "type": "ChatMessage" },
        "data": {
            "message": {
                "username": username,
                "displayName": username,
                "message": message,
                "role": role
            }
        }
    });
    Message::Text(raw.to_string().into())
}

fn chat(username: &str, role: u8, message: &str) -> ClientEvent {
    ClientEvent::Chat(ChatMessage {
        username: username.to_string(),
        display_name: None,
        message: message.to_string(),
        role,
    })
}

/// Feed a sequence of chat events into a fresh app state, returning the
/// final state and every UI update that was pushed.
async fn drive(events: Vec<ClientEvent>) -> (AppState, Vec<UiUpdate>) {
    let mut state = AppState::new(Config::default());
    let (ui_tx, mut ui_rx) = mpsc::channel(256);

    for event in events {
        app::handle_client_event(&mut state, event, &ui_tx).await;
    }

    let mut updates = Vec::new();
    while let Ok(update) = ui_rx.try_recv() {
        updates.push(update);
    }
    (state, updates)
}

/// The final board pushed to the TUI, if any.
fn last_board(updates: &[UiUpdate]) -> Option<&UiUpdate> {
    updates.iter().rev().find(|u| matches!(u, UiUpdate::Board(_)))
}

// ===========================================================================
// Property 1: decimal validation
// ===========================================================================

#[test]
fn valid_decimal_strings_are_accepted() {
    for input in ["12", "$12", "12.5", "1200.00", "$0.99", "0"] {
        assert!(parse_price(input).is_some(), "should accept {input:?}");
    }
}

#[test]
fn invalid_decimal_strings_are_rejected() {
    for input in ["", "abc", "$$12", "12abc", "12.5 final answer", "12.", ".5", "twelve"] {
        assert!(parse_price(input).is_none(), "should reject {input:?}");
    }
}

// ===========================================================================
// Properties 2-4: round state machine
// ===========================================================================

#[tokio::test]
async fn guesses_while_closed_never_enter_the_board() {
    let (state, updates) = drive(vec![chat("alice", 1, "12.50")]).await;
    assert!(state.session.guesses().is_empty());
    assert!(updates.is_empty());
}

#[tokio::test]
async fn last_write_wins_per_participant() {
    let (state, _) = drive(vec![
        chat("mod", 3, "!openprice"),
        chat("a", 1, "10"),
        chat("b", 1, "20"),
        chat("a", 1, "15"),
    ])
    .await;

    let guesses = state.session.guesses();
    assert_eq!(guesses.len(), 2);
    assert_eq!(guesses[0].username, "a");
    assert_eq!(guesses[0].price, 15.0);
    assert_eq!(guesses[1].username, "b");
    assert_eq!(guesses[1].price, 20.0);
}

#[tokio::test]
async fn clear_empties_the_board_without_touching_the_flag() {
    let (state, _) = drive(vec![
        chat("mod", 3, "!openprice"),
        chat("a", 1, "10"),
        chat("mod", 3, "!clearprice"),
    ])
    .await;
    assert!(state.session.guesses().is_empty());
    assert!(state.session.is_accepting());

    let (state, _) = drive(vec![
        chat("mod", 3, "!openprice"),
        chat("a", 1, "10"),
        chat("mod", 3, "!closeprice"),
        chat("mod", 3, "!clearprice"),
    ])
    .await;
    assert!(state.session.guesses().is_empty());
    assert!(!state.session.is_accepting());
}

// ===========================================================================
// Properties 5-6: closest-match resolution
// ===========================================================================

#[tokio::test]
async fn setprice_highlights_closest_without_going_over() {
    let (state, updates) = drive(vec![
        chat("mod", 3, "!openprice"),
        chat("a", 1, "10"),
        chat("b", 1, "18"),
        chat("c", 1, "25"),
        chat("mod", 3, "!setprice 20"),
    ])
    .await;

    assert_eq!(state.session.highlight(), Some("b"));

    match last_board(&updates) {
        Some(UiUpdate::Board(entries)) => {
            // Sorted descending: c(25), b(18), a(10); only b flagged
            assert_eq!(entries[0].username, "c");
            assert!(!entries[0].is_winner);
            assert_eq!(entries[1].username, "b");
            assert!(entries[1].is_winner);
            assert_eq!(entries[2].username, "a");
            assert!(!entries[2].is_winner);
        }
        other => panic!("expected a Board update, got {other:?}"),
    }
}

#[tokio::test]
async fn setprice_with_all_guesses_over_flags_nobody() {
    let (state, updates) = drive(vec![
        chat("mod", 3, "!openprice"),
        chat("a", 1, "30"),
        chat("mod", 3, "!setprice 20"),
    ])
    .await;

    assert!(state.session.highlight().is_none());
    match last_board(&updates) {
        Some(UiUpdate::Board(entries)) => {
            assert!(entries.iter().all(|e| !e.is_winner));
        }
        other => panic!("expected a Board update, got {other:?}"),
    }
}

// ===========================================================================
// Property 7: role gating
// ===========================================================================

#[tokio::test]
async fn unprivileged_command_tokens_have_no_effect() {
    let (state, _) = drive(vec![
        chat("mod", 3, "!openprice"),
        chat("a", 1, "10"),
        // All from a level-1 viewer:
        chat("viewer", 1, "!closeprice"),
        chat("viewer", 1, "!clearprice"),
        chat("viewer", 1, "!setprice 20"),
    ])
    .await;

    assert!(state.session.is_accepting());
    assert_eq!(state.session.guesses().len(), 1);
    assert!(state.session.highlight().is_none());
}

// ===========================================================================
// Property 8: projection formatting and order
// ===========================================================================

#[test]
fn projection_formats_and_sorts() {
    let mut session = RoundSession::new(3);
    session.handle_chat("mod", "mod", 3, "!openprice");
    session.handle_chat("a", "a", 1, "1000");
    session.handle_chat("b", "b", 1, "999.5");

    let board = project(session.guesses(), None);
    assert_eq!(board[0].username, "a");
    assert_eq!(board[0].formatted_price, "1,000.00");
    assert_eq!(board[1].username, "b");
    assert_eq!(board[1].formatted_price, "999.50");
}

#[test]
fn price_formatting_matches_overlay_style() {
    assert_eq!(format_price(1234.5), "1,234.50");
    assert_eq!(format_price(12.0), "12.00");
    assert_eq!(format_price(1234567.0), "1,234,567.00");
}

// ===========================================================================
// Wire-to-board: frames through the client into the app
// ===========================================================================

#[tokio::test]
async fn full_round_from_raw_frames() {
    // 1. Raw frames -> client events
    let frames = vec![
        Ok(Message::Text(
            r#"{"id":"priceboard-subscribe","status":"ok"}"#.into(),
        )),
        Ok(chat_frame("mod", 3, "!openprice")),
        Ok(chat_frame("alice", 1, "$12.50")),
        Ok(chat_frame("bob", 1, "18")),
        Ok(chat_frame("carol", 1, "not a price")),
        Ok(chat_frame("mod", 3, "!setprice $15")),
    ];

    let (tx, mut rx) = mpsc::channel(64);
    process_event_stream(stream::iter(frames), &tx).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    // The subscribe response is dropped; five chat events remain.
    assert_eq!(events.len(), 5);

    // 2. Client events -> app state -> board
    let (state, updates) = drive(events).await;
    assert_eq!(state.session.guesses().len(), 2, "invalid guess must be dropped");
    assert_eq!(state.session.highlight(), Some("alice"));

    match last_board(&updates) {
        Some(UiUpdate::Board(entries)) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].username, "bob");
            assert_eq!(entries[0].formatted_price, "18.00");
            assert!(!entries[0].is_winner);
            assert_eq!(entries[1].username, "alice");
            assert_eq!(entries[1].formatted_price, "12.50");
            assert!(entries[1].is_winner);
        }
        other => panic!("expected a Board update, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_transitions_reach_the_ui() {
    let (_state, updates) = drive(vec![
        ClientEvent::Connected,
        ClientEvent::Disconnected,
        ClientEvent::Connected,
    ])
    .await;

    let statuses: Vec<_> = updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::ConnectionStatus(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
            ConnectionStatus::Connected,
        ]
    );
}

// ===========================================================================
// App loop lifecycle
// ===========================================================================

#[tokio::test]
async fn app_loop_quits_cleanly_on_user_command() {
    let state = AppState::new(Config::default());
    let (client_tx, client_rx) = mpsc::channel(8);
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (ui_tx, mut ui_rx) = mpsc::channel(64);

    let handle = tokio::spawn(app::run(client_rx, cmd_rx, ui_tx, state));

    client_tx.send(ClientEvent::Connected).await.unwrap();

    // Wait for the connection update before quitting, so the quit cannot
    // win the select race against the client event.
    loop {
        let update = ui_rx.recv().await.expect("ui channel open");
        if update == UiUpdate::ConnectionStatus(ConnectionStatus::Connected) {
            break;
        }
    }

    cmd_tx.send(UserCommand::Quit).await.unwrap();
    handle.await.unwrap().unwrap();
}

// ===========================================================================
// Protocol edge cases
// ===========================================================================

#[test]
fn chat_parsing_survives_unknown_frames() {
    assert!(parse_chat_event(r#"{"event":{"source":"YouTube","type":"Message"},"data":{}}"#).is_none());
    assert!(parse_chat_event("").is_none());
    assert!(parse_chat_event(r#"{"data": {"message": {"username":"x","message":"y"}}}"#).is_none());
}
