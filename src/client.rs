// WebSocket client for the Streamer.bot connection.
//
// Connects to ws://{host}:{port}/, subscribes to Twitch.ChatMessage, and
// forwards parsed events to the application layer over an mpsc channel.
// Reconnects with a fixed delay when the connection drops; the core never
// sees anything but discrete events and connect/disconnect transitions.

use std::time::Duration;

use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::protocol::{parse_chat_event, ChatMessage, SubscribeRequest};

/// Events emitted by the client to the application layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Connected and subscribed to chat events.
    Connected,
    /// The connection dropped; a reconnect attempt follows.
    Disconnected,
    /// A Twitch chat message arrived.
    Chat(ChatMessage),
}

/// Connect to Streamer.bot and forward chat events through `tx`, forever.
///
/// Each successful connection sends the subscribe request, emits
/// [`ClientEvent::Connected`], then reads frames until the connection
/// drops, at which point [`ClientEvent::Disconnected`] is emitted and the
/// loop sleeps before retrying. Returns `Ok(())` only when the receiving
/// side of `tx` is gone (app shutdown).
pub async fn run(conn: ConnectionConfig, tx: mpsc::Sender<ClientEvent>) -> anyhow::Result<()> {
    let url = format!("ws://{}:{}/", conn.host, conn.port);
    let retry_delay = Duration::from_secs(conn.reconnect_delay_secs);

    loop {
        match tokio_tungstenite::connect_async(&url).await {
            Ok((ws_stream, _response)) => {
                info!("connected to Streamer.bot at {url}");
                let (mut write, read) = ws_stream.split();

                let subscribe = serde_json::to_string(&SubscribeRequest::chat_messages())?;
                if let Err(e) = write.send(Message::Text(subscribe.into())).await {
                    warn!("failed to send subscribe request: {e}");
                } else {
                    if tx.send(ClientEvent::Connected).await.is_err() {
                        return Ok(());
                    }
                    if process_event_stream(read, &tx).await.is_err() {
                        return Ok(());
                    }
                    if tx.send(ClientEvent::Disconnected).await.is_err() {
                        return Ok(());
                    }
                }
            }
            Err(e) => {
                warn!("connection to {url} failed: {e}");
            }
        }

        tokio::time::sleep(retry_delay).await;
    }
}

/// Process raw WebSocket [`Message`] items from any [`Stream`], forwarding
/// chat events through `tx`. Frames that are not `Twitch.ChatMessage`
/// events (subscribe responses, other events, non-text frames) are
/// dropped. Returns `Err(())` if the channel is closed (receiver gone),
/// signalling the caller to stop.
///
/// Generic over the stream type so it can be tested with in-memory streams
/// without opening sockets.
pub async fn process_event_stream<St>(
    mut stream: St,
    tx: &mpsc::Sender<ClientEvent>,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg_result) = stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match parse_chat_event(&text) {
                Some(chat) => {
                    if tx.send(ClientEvent::Chat(chat)).await.is_err() {
                        return Err(());
                    }
                }
                None => {
                    debug!("ignoring non-chat frame");
                }
            },
            Ok(Message::Close(_)) => {
                info!("server sent close frame");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
            _ => {
                // Ignore Binary, Ping, Pong, Frame variants.
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
