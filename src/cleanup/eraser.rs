use crate::mailbox::MailboxClient;

/// Ids per provider batch-delete call; Gmail accepts up to 1000.
const BULK_CHUNK: usize = 1000;

/// Delete messages through the provider's batch call, one chunk at a time.
///
/// A failed chunk is logged and skipped, not retried; the return value
/// counts only messages in chunks the provider accepted.
pub async fn delete_bulk(client: &dyn MailboxClient, ids: &[String]) -> usize {
    if ids.is_empty() {
        return 0;
    }

    let mut deleted = 0;
    for chunk in ids.chunks(BULK_CHUNK) {
        match client.batch_delete(chunk).await {
            Ok(()) => {
                deleted += chunk.len();
                tracing::info!("Deleted batch of {} messages", chunk.len());
            }
            Err(err) => {
                tracing::error!("Batch delete of {} messages failed: {}", chunk.len(), err);
            }
        }
    }
    deleted
}

/// Delete messages one by one, bypassing the reversible trash step.
///
/// A per-message failure is logged and that message left uncounted; the
/// loop always runs to the end.
pub async fn delete_permanently(client: &dyn MailboxClient, ids: &[String]) -> usize {
    if ids.is_empty() {
        return 0;
    }

    let mut deleted = 0;
    for id in ids {
        match client.delete_message(id).await {
            Ok(()) => deleted += 1,
            Err(err) => tracing::warn!("Failed to delete message {}: {}", id, err),
        }
    }
    deleted
}
