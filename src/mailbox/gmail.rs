use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{MailboxClient, MailboxError, MailboxResult, MessagePage};
use crate::session::MailboxCredential;

const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Gmail REST v1 mailbox client, authorized by a per-session bearer token.
/// Cheap to construct; one is built per request from the session credential
/// and the shared HTTP connection pool.
pub struct GmailMailbox {
    http: reqwest::Client,
    credential: MailboxCredential,
}

impl GmailMailbox {
    pub fn new(http: reqwest::Client, credential: MailboxCredential) -> Self {
        Self { http, credential }
    }

    /// Map HTTP status classes onto the engine's error taxonomy.
    async fn check(response: reqwest::Response) -> MailboxResult<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MailboxError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailboxError::Unavailable(format!("HTTP {status}: {body}")));
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageId>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageMetadata {
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct BatchDeleteRequest<'a> {
    ids: &'a [String],
}

#[async_trait]
impl MailboxClient for GmailMailbox {
    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> MailboxResult<MessagePage> {
        let page_size = page_size.to_string();
        let mut request = self
            .http
            .get(format!("{API_BASE}/messages"))
            .bearer_auth(&self.credential.access_token)
            .query(&[("q", query), ("maxResults", page_size.as_str())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = Self::check(request.send().await?).await?;
        let body: ListResponse = response.json().await?;

        Ok(MessagePage {
            ids: body.messages.into_iter().map(|m| m.id).collect(),
            next_page_token: body.next_page_token,
        })
    }

    async fn get_from_header(&self, id: &str) -> MailboxResult<Option<String>> {
        let request = self
            .http
            .get(format!("{API_BASE}/messages/{id}"))
            .bearer_auth(&self.credential.access_token)
            .query(&[("format", "metadata"), ("metadataHeaders", "From")]);

        let response = Self::check(request.send().await?).await?;
        let body: MessageMetadata = response.json().await?;

        Ok(body
            .payload
            .map(|payload| payload.headers)
            .unwrap_or_default()
            .into_iter()
            .find(|header| header.name.eq_ignore_ascii_case("From"))
            .map(|header| header.value))
    }

    async fn delete_message(&self, id: &str) -> MailboxResult<()> {
        let response = self
            .http
            .delete(format!("{API_BASE}/messages/{id}"))
            .bearer_auth(&self.credential.access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn batch_delete(&self, ids: &[String]) -> MailboxResult<()> {
        let response = self
            .http
            .post(format!("{API_BASE}/messages/batchDelete"))
            .bearer_auth(&self.credential.access_token)
            .json(&BatchDeleteRequest { ids })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
