use crate::bot::embed::Embed;
use crate::bot::EmbedSender;
use crate::error::DiscordError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const API_BASE: &str = "https://discord.com/api/v10";

/// Posts ticker cards through the Discord REST API.
pub struct DiscordRest {
    client: Client,
    token: String,
    api_base: String,
}

impl DiscordRest {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, DiscordError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.to_string(),
            api_base: API_BASE.to_string(),
        })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel_id)
    }

    async fn post_embed(&self, channel_id: &str, embed: &Embed) -> Result<(), DiscordError> {
        let response = self
            .client
            .post(self.messages_url(channel_id))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&message_body(embed))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscordError::Status(status));
        }
        Ok(())
    }
}

impl EmbedSender for DiscordRest {
    fn send_embed<'a>(
        &'a self,
        channel_id: &'a str,
        embed: &'a Embed,
    ) -> BoxFuture<'a, Result<(), DiscordError>> {
        self.post_embed(channel_id, embed).boxed()
    }
}

fn message_body(embed: &Embed) -> Value {
    json!({ "embeds": [embed] })
}
