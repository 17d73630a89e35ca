use crate::bot::ChatEvent;
use crate::error::DiscordError;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;
const OP_HEARTBEAT_ACK: u8 = 11;

const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: Value,
    s: Option<u64>,
    t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageCreate {
    channel_id: String,
    #[serde(default)]
    content: String,
    author: Author,
}

#[derive(Debug, Deserialize)]
struct Author {
    id: String,
    username: String,
}

#[derive(Debug)]
enum Action {
    Event(ChatEvent),
    Heartbeat,
    Nothing,
}

/// Per-connection gateway state.
#[derive(Debug, Default)]
struct Session {
    last_seq: Option<u64>,
    self_id: Option<String>,
}

impl Session {
    fn apply(&mut self, payload: GatewayPayload) -> Result<Action, DiscordError> {
        if payload.s.is_some() {
            self.last_seq = payload.s;
        }

        match payload.op {
            OP_DISPATCH => self.dispatch(payload.t.as_deref(), payload.d),
            OP_HEARTBEAT => Ok(Action::Heartbeat),
            OP_HEARTBEAT_ACK => Ok(Action::Nothing),
            OP_RECONNECT => Err(DiscordError::Protocol("server requested reconnect".into())),
            OP_INVALID_SESSION => Err(DiscordError::Protocol("invalid session".into())),
            op => {
                debug!("Ignoring gateway opcode {}", op);
                Ok(Action::Nothing)
            }
        }
    }

    fn dispatch(&mut self, kind: Option<&str>, data: Value) -> Result<Action, DiscordError> {
        match kind {
            Some("READY") => {
                let id = data["user"]["id"].as_str().map(str::to_string);
                info!("Gateway ready as user {}", id.as_deref().unwrap_or("?"));
                self.self_id = id;
                Ok(Action::Nothing)
            }
            Some("MESSAGE_CREATE") => {
                let message: MessageCreate = serde_json::from_value(data)?;
                if self.self_id.as_deref() == Some(message.author.id.as_str()) {
                    return Ok(Action::Nothing);
                }
                Ok(Action::Event(ChatEvent {
                    channel_id: message.channel_id,
                    author: message.author.username,
                    content: message.content,
                    received_at: Instant::now(),
                }))
            }
            _ => Ok(Action::Nothing),
        }
    }
}

fn identify_payload(token: &str) -> Value {
    json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT,
            "properties": {
                "os": std::env::consts::OS,
                "browser": env!("CARGO_PKG_NAME"),
                "device": env!("CARGO_PKG_NAME"),
            }
        }
    })
}

fn heartbeat_payload(last_seq: Option<u64>) -> Value {
    json!({ "op": OP_HEARTBEAT, "d": last_seq })
}

/// Runs one gateway session, forwarding chat messages to `sender` until the
/// connection drops. Returns `Ok` only when the receiving side has gone away.
pub async fn connect_to_gateway(
    token: &str,
    sender: mpsc::Sender<ChatEvent>,
) -> Result<(), DiscordError> {
    info!("Connecting to Discord gateway: {}", GATEWAY_URL);
    let (ws_stream, _) = connect_async(GATEWAY_URL).await?;
    let (mut write, mut read) = ws_stream.split();

    let hello: GatewayPayload = match read.next().await {
        Some(Ok(Message::Text(text))) => serde_json::from_str(&text)?,
        Some(Err(e)) => return Err(e.into()),
        _ => return Err(DiscordError::Protocol("expected hello".into())),
    };
    if hello.op != OP_HELLO {
        return Err(DiscordError::Protocol(format!(
            "expected hello, got opcode {}",
            hello.op
        )));
    }
    let interval_ms = hello.d["heartbeat_interval"]
        .as_u64()
        .ok_or_else(|| DiscordError::Protocol("hello without heartbeat interval".into()))?;

    write
        .send(Message::Text(identify_payload(token).to_string()))
        .await?;
    info!("Identified, heartbeating every {}ms", interval_ms);

    let period = Duration::from_millis(interval_ms.max(1));
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    let mut session = Session::default();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                write
                    .send(Message::Text(heartbeat_payload(session.last_seq).to_string()))
                    .await?;
            }
            message = read.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        return Err(DiscordError::Protocol(format!("connection closed: {:?}", frame)));
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(DiscordError::Protocol("connection ended".into())),
                };

                let payload: GatewayPayload = match serde_json::from_str(&text) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to parse gateway payload: {}", e);
                        continue;
                    }
                };

                let action = match session.apply(payload) {
                    Ok(action) => action,
                    Err(DiscordError::Json(e)) => {
                        warn!("Skipping malformed gateway event: {}", e);
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                match action {
                    Action::Event(event) => {
                        if sender.send(event).await.is_err() {
                            info!("Event receiver dropped, leaving gateway");
                            return Ok(());
                        }
                    }
                    Action::Heartbeat => {
                        write
                            .send(Message::Text(heartbeat_payload(session.last_seq).to_string()))
                            .await?;
                    }
                    Action::Nothing => {}
                }
            }
        }
    }
}
