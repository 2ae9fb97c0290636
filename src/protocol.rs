// Message types: the Streamer.bot wire protocol on one side, and the
// internal channel messages between the app orchestrator and the TUI on
// the other.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::game::board::BoardEntry;

// ---------------------------------------------------------------------------
// Streamer.bot roles
// ---------------------------------------------------------------------------

/// Twitch chat roles as numbered by Streamer.bot.
pub const ROLE_VIEWER: u8 = 1;
pub const ROLE_VIP: u8 = 2;
pub const ROLE_MODERATOR: u8 = 3;
pub const ROLE_BROADCASTER: u8 = 4;

// ---------------------------------------------------------------------------
// Outbound: subscription request
// ---------------------------------------------------------------------------

/// The request sent right after connecting to subscribe to Twitch chat
/// events. Streamer.bot replies with a status frame carrying the same `id`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    pub request: String,
    pub id: String,
    pub events: SubscriptionEvents,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionEvents {
    #[serde(rename = "Twitch")]
    pub twitch: Vec<String>,
}

impl SubscribeRequest {
    /// Subscribe to `Twitch.ChatMessage` only.
    pub fn chat_messages() -> Self {
        SubscribeRequest {
            request: "Subscribe".to_string(),
            id: "priceboard-subscribe".to_string(),
            events: SubscriptionEvents {
                twitch: vec!["ChatMessage".to_string()],
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound: event envelope and chat payload
// ---------------------------------------------------------------------------

/// Top-level shape of every frame Streamer.bot sends. Request responses
/// have no `event` field; events carry their payload under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub event: Option<EventDescriptor>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDescriptor {
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
}

/// `data` payload of a `Twitch.ChatMessage` event. Streamer.bot nests the
/// chat message itself under `data.message`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageData {
    pub message: ChatMessage,
}

/// The fields of a Twitch chat message this overlay cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    pub message: String,
    /// Numeric role, see the `ROLE_*` constants. Defaults to viewer when
    /// the field is missing.
    #[serde(default = "default_role")]
    pub role: u8,
}

fn default_role() -> u8 {
    ROLE_VIEWER
}

impl ChatMessage {
    /// Name to show on the board: display name when present, else login.
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Parse a raw WebSocket text frame. Returns the chat message when the
/// frame is a `Twitch.ChatMessage` event; `None` for request responses,
/// other event types, and malformed JSON (all of which are ignored).
pub fn parse_chat_event(raw: &str) -> Option<ChatMessage> {
    let envelope: EventEnvelope = serde_json::from_str(raw).ok()?;
    let event = envelope.event?;
    if event.source != "Twitch" || event.event_type != "ChatMessage" {
        return None;
    }
    let data: ChatMessageData = serde_json::from_value(envelope.data?).ok()?;
    Some(data.message)
}

// ---------------------------------------------------------------------------
// Internal: app -> TUI updates, TUI -> app commands
// ---------------------------------------------------------------------------

/// WebSocket connection status, surfaced in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Commands sent from the TUI back to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Quit,
}

/// Updates pushed from the app orchestrator to the TUI render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Full re-projection of the guess board.
    Board(Vec<BoardEntry>),
    /// The accepting flag changed (or initial state at startup).
    RoundStatus {
        accepting: bool,
        opened_at: Option<DateTime<Local>>,
    },
    /// The upstream connection came up or went down.
    ConnectionStatus(ConnectionStatus),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
