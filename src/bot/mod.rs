pub mod cooldown;
pub mod dispatcher;
pub mod embed;

use crate::error::DiscordError;
use embed::Embed;
use futures::future::BoxFuture;
use tokio::time::Instant;

pub use cooldown::CooldownGate;
pub use dispatcher::Dispatcher;

/// An inbound chat message, as delivered by the gateway.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub channel_id: String,
    pub author: String,
    pub content: String,
    pub received_at: Instant,
}

/// Outbound side of the chat service.
pub trait EmbedSender: Send + Sync {
    fn send_embed<'a>(
        &'a self,
        channel_id: &'a str,
        embed: &'a Embed,
    ) -> BoxFuture<'a, Result<(), DiscordError>>;
}
