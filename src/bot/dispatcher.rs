use super::cooldown::CooldownGate;
use super::embed::ticker_embed;
use super::{ChatEvent, EmbedSender};
use crate::cache::Resolver;
use crate::error::TickerError;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

pub const COMMANDS: [&str; 2] = ["!c", "!crypto"];

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A ticker card went out. `delivered` is false when the chat service
    /// rejected it; the cooldown is consumed either way.
    Sent { delivered: bool },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    ChannelNotAllowed,
    WrongArity(usize),
    UnknownCommand,
    CoolingDown,
    NotFound,
    FetchFailed,
}

pub struct Dispatcher {
    channels: HashSet<String>,
    gate: Arc<CooldownGate>,
    resolver: Resolver,
    sender: Arc<dyn EmbedSender>,
}

impl Dispatcher {
    pub fn new<I, S>(
        channels: I,
        gate: Arc<CooldownGate>,
        resolver: Resolver,
        sender: Arc<dyn EmbedSender>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
            gate,
            resolver,
            sender,
        }
    }

    /// Runs one event through the filters and, if it survives them, answers
    /// it. Every failure is a silent drop from the channel's point of view.
    pub async fn handle(&self, event: &ChatEvent) -> Outcome {
        let query = match self.accept(event) {
            Ok(query) => query,
            Err(reason) => return Outcome::Ignored(reason),
        };

        let fresh = match self.resolver.resolve(query).await {
            Ok(asset) => asset,
            Err(e @ TickerError::NotFound(_)) => {
                debug!("{}", e);
                return Outcome::Ignored(IgnoreReason::NotFound);
            }
            Err(_) => return Outcome::Ignored(IgnoreReason::FetchFailed),
        };

        let embed = ticker_embed(&fresh);
        let delivered = match self.sender.send_embed(&event.channel_id, &embed).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Error sending message to {}: {}", event.channel_id, e);
                false
            }
        };

        self.gate.record_at(&event.channel_id, event.received_at);
        info!(
            "Answered '{}' in {} with {}",
            query, event.channel_id, fresh.id
        );

        Outcome::Sent { delivered }
    }

    /// Synchronous filters: channel, syntax and cooldown. Yields the query.
    fn accept<'e>(&self, event: &'e ChatEvent) -> Result<&'e str, IgnoreReason> {
        if !self.channels.contains(&event.channel_id) {
            return Err(IgnoreReason::ChannelNotAllowed);
        }

        let tokens: Vec<&str> = event.content.split_whitespace().collect();
        let (command, query) = match tokens.as_slice() {
            [command, query] => (*command, *query),
            other => {
                debug!("Ignoring message with {} tokens", other.len());
                return Err(IgnoreReason::WrongArity(other.len()));
            }
        };

        if !COMMANDS.contains(&command) {
            return Err(IgnoreReason::UnknownCommand);
        }

        if !self.gate.allow_at(&event.channel_id, event.received_at) {
            info!("Rate limited in {}", event.channel_id);
            return Err(IgnoreReason::CoolingDown);
        }

        Ok(query)
    }
}
