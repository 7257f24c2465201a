pub mod engine;
pub mod eraser;
pub mod grouper;
pub mod resolver;
pub mod selector;

use serde::{Deserialize, Serialize};

use self::grouper::EmailGroup;
use self::selector::Selector;

/// Age threshold applied when the caller does not pick one, and the one the
/// stats view always uses.
pub const DEFAULT_OLD_MONTHS: u32 = 12;

/// Which categories a preview or cleanup run should cover.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanupRequest {
    pub clean_unread: bool,
    pub clean_spam: bool,
    pub clean_trash: bool,
    pub clean_old_emails: bool,
    pub old_emails_months: u32,
}

impl Default for CleanupRequest {
    fn default() -> Self {
        Self {
            clean_unread: false,
            clean_spam: false,
            clean_trash: false,
            clean_old_emails: false,
            old_emails_months: DEFAULT_OLD_MONTHS,
        }
    }
}

impl CleanupRequest {
    /// Selectors the caller opted into, in fixed category order.
    pub fn selected_selectors(&self) -> Vec<Selector> {
        let mut selectors = Vec::new();
        if self.clean_unread {
            selectors.push(Selector::Unread);
        }
        if self.clean_spam {
            selectors.push(Selector::Spam);
        }
        if self.clean_trash {
            selectors.push(Selector::Trash);
        }
        if self.clean_old_emails {
            selectors.push(Selector::OlderThan(self.old_emails_months));
        }
        selectors
    }
}

/// Match counts for the four fixed selectors.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxStats {
    pub unread_count: usize,
    pub spam_count: usize,
    pub trash_count: usize,
    pub old_emails_count: usize,
}

/// Sender groups for everything a cleanup run would touch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub groups: Vec<EmailGroup>,
    pub total_emails: usize,
}

/// Per-category deletion counts for one cleanup run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub unread_deleted: usize,
    pub spam_deleted: usize,
    pub trash_deleted: usize,
    pub old_emails_deleted: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.unread_deleted + self.spam_deleted + self.trash_deleted + self.old_emails_deleted
    }
}

/// Result of one cleanup run. Deletions already issued stand even when
/// `success` is false.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOutcome {
    pub success: bool,
    pub total_deleted: usize,
    pub message: String,
    pub details: CategoryCounts,
}
