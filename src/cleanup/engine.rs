use std::sync::Arc;

use crate::mailbox::MailboxClient;

use super::grouper::EmailGroup;
use super::selector::Selector;
use super::{
    eraser, grouper, resolver, CategoryCounts, CleanupOutcome, CleanupRequest, MailboxStats,
    PreviewOutcome, DEFAULT_OLD_MONTHS,
};

/// Composes resolver, grouper and eraser into the three operations the API
/// exposes. Stateless across calls; one engine is built per request from
/// the session's mailbox client.
pub struct CleanupEngine {
    mailbox: Arc<dyn MailboxClient>,
}

impl CleanupEngine {
    pub fn new(mailbox: Arc<dyn MailboxClient>) -> Self {
        Self { mailbox }
    }

    /// Count matches for each of the four fixed selectors.
    ///
    /// Never reports an error: a selector whose resolution fails simply
    /// counts zero, without blocking the others.
    pub async fn stats(&self) -> MailboxStats {
        MailboxStats {
            unread_count: self.count(Selector::Unread).await,
            spam_count: self.count(Selector::Spam).await,
            trash_count: self.count(Selector::Trash).await,
            old_emails_count: self.count(Selector::OlderThan(DEFAULT_OLD_MONTHS)).await,
        }
    }

    async fn count(&self, selector: Selector) -> usize {
        resolver::resolve_ids(self.mailbox.as_ref(), &selector.query())
            .await
            .len()
    }

    /// Group everything a cleanup run with this request would touch.
    ///
    /// All-or-nothing: unlike grouping's per-message tolerance, any failure
    /// here downgrades the whole preview to an error response and the
    /// groups produced so far are discarded.
    pub async fn preview(&self, request: &CleanupRequest) -> PreviewOutcome {
        match self.build_preview(request).await {
            Ok(groups) => PreviewOutcome {
                success: true,
                message: None,
                total_emails: groups.iter().map(|group| group.count).sum(),
                groups,
            },
            Err(err) => {
                tracing::error!("Preview failed: {:#}", err);
                PreviewOutcome {
                    success: false,
                    message: Some(format!("Error loading preview: {err}")),
                    groups: Vec::new(),
                    total_emails: 0,
                }
            }
        }
    }

    async fn build_preview(&self, request: &CleanupRequest) -> anyhow::Result<Vec<EmailGroup>> {
        let mut all_groups = Vec::new();

        for selector in request.selected_selectors() {
            tracing::info!("Building preview for category '{}'", selector.category());
            let ids = resolver::resolve_ids(self.mailbox.as_ref(), &selector.query()).await;
            if ids.is_empty() {
                continue;
            }

            let groups =
                grouper::group_by_sender(self.mailbox.as_ref(), &ids, selector.category()).await;
            all_groups.extend(groups);
        }

        Ok(all_groups)
    }

    /// Delete everything the request selects, category by category.
    ///
    /// A failure marks the response unsuccessful, but deletions already
    /// issued are never rolled back and stay counted in the details.
    pub async fn cleanup(&self, request: &CleanupRequest) -> CleanupOutcome {
        let mut details = CategoryCounts::default();

        match self.run_cleanup(request, &mut details).await {
            Ok(()) => {
                let total_deleted = details.total();
                CleanupOutcome {
                    success: true,
                    total_deleted,
                    message: format!("Successfully deleted {total_deleted} emails"),
                    details,
                }
            }
            Err(err) => {
                tracing::error!("Cleanup failed: {:#}", err);
                CleanupOutcome {
                    success: false,
                    total_deleted: details.total(),
                    message: format!("Error cleaning up emails: {err}"),
                    details,
                }
            }
        }
    }

    async fn run_cleanup(
        &self,
        request: &CleanupRequest,
        details: &mut CategoryCounts,
    ) -> anyhow::Result<()> {
        for selector in request.selected_selectors() {
            tracing::info!("Cleaning category '{}'", selector.category());
            let ids = resolver::resolve_ids(self.mailbox.as_ref(), &selector.query()).await;

            let deleted = if selector.requires_permanent_delete() {
                eraser::delete_permanently(self.mailbox.as_ref(), &ids).await
            } else {
                eraser::delete_bulk(self.mailbox.as_ref(), &ids).await
            };

            match selector {
                Selector::Unread => details.unread_deleted = deleted,
                Selector::Spam => details.spam_deleted = deleted,
                Selector::Trash => details.trash_deleted = deleted,
                Selector::OlderThan(_) => details.old_emails_deleted = deleted,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::fake::{FakeMailbox, ANY_BEFORE_QUERY};

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    fn engine(mailbox: FakeMailbox) -> CleanupEngine {
        CleanupEngine::new(Arc::new(mailbox))
    }

    #[tokio::test]
    async fn stats_counts_every_fixed_selector() {
        let mailbox = FakeMailbox {
            results_by_query: [
                ("is:unread".to_string(), ids(&["u1", "u2"])),
                ("in:spam".to_string(), ids(&["s1"])),
                ("in:trash".to_string(), ids(&[])),
                (ANY_BEFORE_QUERY.to_string(), ids(&["o1", "o2", "o3"])),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        let stats = engine(mailbox).stats().await;
        assert_eq!(stats.unread_count, 2);
        assert_eq!(stats.spam_count, 1);
        assert_eq!(stats.trash_count, 0);
        assert_eq!(stats.old_emails_count, 3);
    }

    #[tokio::test]
    async fn stats_reports_zero_for_a_failing_selector() {
        let mailbox = FakeMailbox {
            results_by_query: [
                ("is:unread".to_string(), ids(&["u1"])),
                ("in:spam".to_string(), ids(&["s1", "s2"])),
                (ANY_BEFORE_QUERY.to_string(), ids(&["o1"])),
            ]
            .into_iter()
            .collect(),
            failing_queries: ["in:trash".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let stats = engine(mailbox).stats().await;
        assert_eq!(stats.unread_count, 1);
        assert_eq!(stats.spam_count, 2);
        assert_eq!(stats.trash_count, 0);
        assert_eq!(stats.old_emails_count, 1);
    }

    #[tokio::test]
    async fn preview_skips_empty_categories_and_tags_groups() {
        let mailbox = FakeMailbox {
            results_by_query: [
                ("is:unread".to_string(), ids(&["u1", "u2"])),
                ("in:spam".to_string(), ids(&[])),
            ]
            .into_iter()
            .collect(),
            senders: [
                ("u1".to_string(), "Alice <alice@x.com>".to_string()),
                ("u2".to_string(), "Alice <alice@x.com>".to_string()),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        let request = CleanupRequest {
            clean_unread: true,
            clean_spam: true,
            ..Default::default()
        };

        let preview = engine(mailbox).preview(&request).await;
        assert!(preview.success);
        assert_eq!(preview.groups.len(), 1);
        assert_eq!(preview.groups[0].category, "unread");
        assert_eq!(preview.total_emails, 2);
    }

    #[tokio::test]
    async fn preview_concatenates_categories_in_request_order() {
        let mailbox = FakeMailbox {
            results_by_query: [
                ("is:unread".to_string(), ids(&["u1"])),
                ("in:trash".to_string(), ids(&["t1", "t2"])),
            ]
            .into_iter()
            .collect(),
            senders: [
                ("u1".to_string(), "Alice <alice@x.com>".to_string()),
                ("t1".to_string(), "Bob <bob@y.com>".to_string()),
                ("t2".to_string(), "Carol <carol@z.com>".to_string()),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        let request = CleanupRequest {
            clean_unread: true,
            clean_trash: true,
            ..Default::default()
        };

        let preview = engine(mailbox).preview(&request).await;
        assert_eq!(preview.groups.len(), 3);
        assert_eq!(preview.groups[0].category, "unread");
        assert_eq!(preview.groups[1].category, "trash");
        assert_eq!(preview.groups[2].category, "trash");
        assert_eq!(preview.total_emails, 3);
    }

    #[tokio::test]
    async fn cleanup_routes_categories_to_the_right_eraser() {
        let mailbox = FakeMailbox {
            results_by_query: [
                ("is:unread".to_string(), ids(&["u1", "u2"])),
                ("in:spam".to_string(), ids(&["s1", "s2", "s3"])),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };
        let mailbox = Arc::new(mailbox);
        let engine = CleanupEngine::new(mailbox.clone());

        let request = CleanupRequest {
            clean_unread: true,
            clean_spam: true,
            ..Default::default()
        };

        let outcome = engine.cleanup(&request).await;
        assert!(outcome.success);
        assert_eq!(outcome.details.unread_deleted, 2);
        assert_eq!(outcome.details.spam_deleted, 3);
        assert_eq!(outcome.details.trash_deleted, 0);
        assert_eq!(outcome.total_deleted, 5);
        assert_eq!(outcome.message, "Successfully deleted 5 emails");

        // Unread went through the batch call, spam one message at a time.
        assert_eq!(*mailbox.batch_sizes.lock().unwrap(), vec![2]);
        assert_eq!(*mailbox.deleted.lock().unwrap(), ids(&["s1", "s2", "s3"]));
    }

    #[tokio::test]
    async fn cleanup_reports_partial_success_as_success() {
        let mailbox = FakeMailbox {
            results_by_query: [("is:unread".to_string(), ids(&["u1", "u2"]))]
                .into_iter()
                .collect(),
            failing_batches: [0].into_iter().collect(),
            ..Default::default()
        };

        let request = CleanupRequest {
            clean_unread: true,
            ..Default::default()
        };

        let outcome = engine(mailbox).cleanup(&request).await;
        assert!(outcome.success);
        assert_eq!(outcome.details.unread_deleted, 0);
        assert_eq!(outcome.total_deleted, 0);
    }

    #[tokio::test]
    async fn cleanup_with_nothing_selected_deletes_nothing() {
        let mailbox = FakeMailbox {
            results_by_query: [("is:unread".to_string(), ids(&["u1"]))]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let mailbox = Arc::new(mailbox);
        let engine = CleanupEngine::new(mailbox.clone());

        let outcome = engine.cleanup(&CleanupRequest::default()).await;
        assert!(outcome.success);
        assert_eq!(outcome.total_deleted, 0);
        assert!(mailbox.batch_sizes.lock().unwrap().is_empty());
        assert!(mailbox.deleted.lock().unwrap().is_empty());
    }
}
