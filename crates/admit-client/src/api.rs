//! Durable request/response API.
//!
//! Every call carries the session bearer token. Durable calls have no
//! automatic retry; failures surface to the call site and the triggering
//! action stays in its pre-call state.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::store::HistoryScope;
use admit_wire::{Message, Notification, RoomKey, UserId};
use async_trait::async_trait;
use std::time::Duration;

/// The durable endpoints the chat client consumes.
#[async_trait]
pub trait AdmissionApi: Send + Sync + 'static {
    async fn fetch_history(&self, scope: &HistoryScope) -> Result<Vec<Message>>;
    async fn send_message(
        &self,
        room: &RoomKey,
        content: &str,
        sender: UserId,
        receiver: UserId,
    ) -> Result<Message>;
    async fn set_reaction(&self, message_id: i64, reaction: &str) -> Result<()>;
    async fn delete_message(&self, message_id: i64) -> Result<()>;
    async fn fetch_notifications(&self, user: UserId) -> Result<Vec<Notification>>;
    async fn mark_read(&self, notification_id: i64) -> Result<()>;
    async fn mark_all_read(&self, user: UserId) -> Result<()>;
}

/// HTTP implementation over the admission portal's REST API.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(HttpApi {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl AdmissionApi for HttpApi {
    async fn fetch_history(&self, scope: &HistoryScope) -> Result<Vec<Message>> {
        let url = match scope {
            HistoryScope::Room(room) => self.url(&format!("/chat/{}/messages", room)),
            HistoryScope::Global => self.url("/chat/messages"),
        };
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_message(
        &self,
        room: &RoomKey,
        content: &str,
        sender: UserId,
        receiver: UserId,
    ) -> Result<Message> {
        let url = self.url(&format!("/chat/{}/messages", room));
        let body = serde_json::json!({
            "content": content,
            "sender": sender,
            "receiver": receiver,
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn set_reaction(&self, message_id: i64, reaction: &str) -> Result<()> {
        let url = self.url(&format!("/chat/messages/{}/reaction", message_id));
        let body = serde_json::json!({ "reaction": reaction });
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_message(&self, message_id: i64) -> Result<()> {
        let url = self.url(&format!("/chat/messages/{}", message_id));
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_notifications(&self, user: UserId) -> Result<Vec<Notification>> {
        let url = self.url(&format!("/notifications/{}", user));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn mark_read(&self, notification_id: i64) -> Result<()> {
        let url = self.url(&format!("/notifications/{}/read", notification_id));
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn mark_all_read(&self, user: UserId) -> Result<()> {
        let url = self.url(&format!("/notifications/user/{}/read-all", user));
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig {
            api_url: "http://localhost:8080/api/".to_string(),
            ..Default::default()
        };
        let api = HttpApi::new(&config, "tok").unwrap();
        assert_eq!(api.url("/chat/messages"), "http://localhost:8080/api/chat/messages");
    }
}
