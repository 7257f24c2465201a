pub mod gmail;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;

/// One page of message ids from a list query.
#[derive(Debug, Default)]
pub struct MessagePage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Provider failures, collapsed to the two classes the engine cares about:
/// back-off-and-retry versus log-and-move-on.
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox provider rate limit hit")]
    RateLimited,
    #[error("mailbox provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for MailboxError {
    fn from(err: reqwest::Error) -> Self {
        MailboxError::Unavailable(err.to_string())
    }
}

pub type MailboxResult<T> = Result<T, MailboxError>;

/// Operations the cleanup engine needs from a mailbox provider.
/// Implemented for Gmail over REST; tests substitute a scripted fake.
#[async_trait]
pub trait MailboxClient: Send + Sync {
    /// List ids of messages matching a search query, one page at a time.
    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> MailboxResult<MessagePage>;

    /// Fetch only the raw "From" header of one message.
    async fn get_from_header(&self, id: &str) -> MailboxResult<Option<String>>;

    /// Permanently delete one message.
    async fn delete_message(&self, id: &str) -> MailboxResult<()>;

    /// Delete a batch of messages in a single provider call.
    async fn batch_delete(&self, ids: &[String]) -> MailboxResult<()>;
}
