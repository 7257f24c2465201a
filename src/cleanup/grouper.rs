use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::mailbox::{MailboxClient, MailboxError};

/// Metadata fetches in flight at once; one chunk's members all run together,
/// chunks themselves run strictly one after another.
const CHUNK_SIZE: usize = 50;
/// Extra attempts after a rate-limited fetch before the id is dropped.
const MAX_RETRIES: u32 = 3;
/// First backoff delay; doubles on every retry.
const BASE_DELAY: Duration = Duration::from_millis(1000);
/// Pause between chunks to keep the sustained request rate down.
const CHUNK_PAUSE: Duration = Duration::from_millis(500);

/// A cluster of messages sharing a normalized sender address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailGroup {
    /// Raw "From" header of the first message seen for this sender.
    pub group_name: String,
    pub group_type: String,
    pub category: String,
    pub count: usize,
    pub message_ids: Vec<String>,
    pub description: String,
    pub selected: bool,
}

/// Cluster `ids` by sender, fetching the "From" header of every message with
/// bounded concurrency and rate-limit-aware retry.
///
/// Individual fetch failures drop that message from the result; this
/// function itself never fails. Groups come back sorted by member count
/// descending, ties keeping first-seen order.
pub async fn group_by_sender(
    client: &dyn MailboxClient,
    ids: &[String],
    category: &str,
) -> Vec<EmailGroup> {
    if ids.is_empty() {
        return Vec::new();
    }

    tracing::info!("Grouping {} '{}' messages by sender", ids.len(), category);

    let mut groups: HashMap<String, EmailGroup> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    let chunks: Vec<&[String]> = ids.chunks(CHUNK_SIZE).collect();
    let chunk_count = chunks.len();

    for (chunk_index, chunk) in chunks.into_iter().enumerate() {
        // Join point: the whole chunk is in flight together, then the
        // results fold into the group table on this task only.
        let fetches = chunk.iter().map(|id| fetch_sender(client, id));
        let results = join_all(fetches).await;

        for (id, raw_from) in results.into_iter().flatten() {
            let key = normalize_sender(&raw_from);
            let group = groups.entry(key.clone()).or_insert_with(|| {
                first_seen.push(key.clone());
                EmailGroup {
                    group_name: raw_from.clone(),
                    group_type: "sender".to_string(),
                    category: category.to_string(),
                    count: 0,
                    message_ids: Vec::new(),
                    description: format!("Emails from {}", key),
                    selected: true,
                }
            });
            group.count += 1;
            group.message_ids.push(id);
        }

        tracing::debug!(
            "Grouped chunk {}/{} for '{}'",
            chunk_index + 1,
            chunk_count,
            category
        );

        if chunk_index + 1 < chunk_count {
            tokio::time::sleep(CHUNK_PAUSE).await;
        }
    }

    let mut ordered: Vec<EmailGroup> = first_seen
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect();
    ordered.sort_by(|a, b| b.count.cmp(&a.count));

    tracing::info!(
        "Grouped {} '{}' messages into {} sender groups",
        ids.len(),
        category,
        ordered.len()
    );
    ordered
}

/// Fetch one message's raw "From" header, backing off on rate limits.
///
/// Returns `None` when the id has to be dropped: rate-limit retries
/// exhausted, or any other provider error (those are not worth retrying).
async fn fetch_sender(client: &dyn MailboxClient, id: &str) -> Option<(String, String)> {
    let mut delay = BASE_DELAY;

    for attempt in 0..=MAX_RETRIES {
        match client.get_from_header(id).await {
            Ok(Some(raw_from)) => return Some((id.to_string(), raw_from)),
            Ok(None) => return Some((id.to_string(), "Unknown Sender".to_string())),
            Err(MailboxError::RateLimited) => {
                if attempt == MAX_RETRIES {
                    tracing::error!(
                        "Dropping message {} after {} rate-limited attempts",
                        id,
                        MAX_RETRIES + 1
                    );
                    return None;
                }
                tracing::warn!(
                    "Rate limit hit for message {}, retrying in {:?} (attempt {}/{})",
                    id,
                    delay,
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => {
                tracing::warn!("Skipping message {}: {}", id, err);
                return None;
            }
        }
    }

    None
}

/// Group key for a raw "From" header: the angle-bracketed address when
/// present, otherwise the raw header text.
fn normalize_sender(raw_from: &str) -> String {
    if let Some(start) = raw_from.find('<') {
        if let Some(len) = raw_from[start + 1..].find('>') {
            return raw_from[start + 1..start + 1 + len].to_string();
        }
    }
    raw_from.to_string()
}
