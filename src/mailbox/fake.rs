//! Scripted in-memory mailbox used by the engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{MailboxClient, MailboxError, MailboxResult, MessagePage};

/// Key in [`FakeMailbox::results_by_query`] that matches any age query,
/// since `before:` dates are computed from the current day.
pub const ANY_BEFORE_QUERY: &str = "before:";

#[derive(Default)]
pub struct FakeMailbox {
    /// Pages served in order by `list_messages` when `results_by_query` is
    /// empty; the page token is the page index.
    pub pages: Vec<Vec<String>>,
    /// 0-based page index whose fetch fails.
    pub failing_page: Option<usize>,
    /// Single-page results per query string.
    pub results_by_query: HashMap<String, Vec<String>>,
    /// Queries whose listing always fails.
    pub failing_queries: HashSet<String>,
    /// Raw "From" header per message id.
    pub senders: HashMap<String, String>,
    /// Rate-limited responses to serve per id before the fetch succeeds.
    pub rate_limited: Mutex<HashMap<String, u32>>,
    /// Ids whose metadata fetch always fails with a non-rate-limit error.
    pub broken: HashSet<String>,
    /// Ids whose single delete fails.
    pub undeletable: HashSet<String>,
    /// 0-based batch-delete call indices that fail.
    pub failing_batches: HashSet<usize>,

    pub list_calls: AtomicUsize,
    pub header_log: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl FakeMailbox {
    pub fn with_senders(senders: &[(&str, &str)]) -> Self {
        Self {
            senders: senders
                .iter()
                .map(|(id, from)| (id.to_string(), from.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn header_fetches_for(&self, id: &str) -> usize {
        self.header_log
            .lock()
            .unwrap()
            .iter()
            .filter(|logged| logged.as_str() == id)
            .count()
    }
}

#[async_trait]
impl MailboxClient for FakeMailbox {
    async fn list_messages(
        &self,
        query: &str,
        _page_size: u32,
        page_token: Option<&str>,
    ) -> MailboxResult<MessagePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let matches = |candidate: &str| {
            candidate == query
                || (candidate == ANY_BEFORE_QUERY && query.starts_with(ANY_BEFORE_QUERY))
        };

        if self.failing_queries.iter().any(|q| matches(q)) {
            return Err(MailboxError::Unavailable("listing failed".to_string()));
        }

        if !self.results_by_query.is_empty() {
            let ids = self
                .results_by_query
                .iter()
                .find(|(candidate, _)| matches(candidate))
                .map(|(_, ids)| ids.clone())
                .unwrap_or_default();
            return Ok(MessagePage {
                ids,
                next_page_token: None,
            });
        }

        let index = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        if self.failing_page == Some(index) {
            return Err(MailboxError::Unavailable("page fetch failed".to_string()));
        }

        Ok(MessagePage {
            ids: self.pages.get(index).cloned().unwrap_or_default(),
            next_page_token: (index + 1 < self.pages.len()).then(|| (index + 1).to_string()),
        })
    }

    async fn get_from_header(&self, id: &str) -> MailboxResult<Option<String>> {
        self.header_log.lock().unwrap().push(id.to_string());

        if self.broken.contains(id) {
            return Err(MailboxError::Unavailable("metadata fetch failed".to_string()));
        }

        if let Some(remaining) = self.rate_limited.lock().unwrap().get_mut(id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(MailboxError::RateLimited);
            }
        }

        Ok(self.senders.get(id).cloned())
    }

    async fn delete_message(&self, id: &str) -> MailboxResult<()> {
        if self.undeletable.contains(id) {
            return Err(MailboxError::Unavailable("delete failed".to_string()));
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn batch_delete(&self, ids: &[String]) -> MailboxResult<()> {
        let mut sizes = self.batch_sizes.lock().unwrap();
        let call_index = sizes.len();
        sizes.push(ids.len());

        if self.failing_batches.contains(&call_index) {
            return Err(MailboxError::Unavailable("batch delete failed".to_string()));
        }
        Ok(())
    }
}
