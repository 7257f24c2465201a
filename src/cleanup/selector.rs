use chrono::{Months, Utc};

/// A semantic bulk-match category, mapped onto a Gmail search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Unread,
    Spam,
    Trash,
    /// Messages older than the given number of months.
    OlderThan(u32),
}

impl Selector {
    /// Category tag used in API responses and logs.
    pub fn category(&self) -> &'static str {
        match self {
            Selector::Unread => "unread",
            Selector::Spam => "spam",
            Selector::Trash => "trash",
            Selector::OlderThan(_) => "old",
        }
    }

    /// The provider search query this selector resolves through.
    pub fn query(&self) -> String {
        match self {
            Selector::Unread => "is:unread".to_string(),
            Selector::Spam => "in:spam".to_string(),
            Selector::Trash => "in:trash".to_string(),
            Selector::OlderThan(months) => {
                let cutoff = Utc::now() - Months::new(*months);
                format!("before:{}", cutoff.format("%Y/%m/%d"))
            }
        }
    }

    /// Spam and trash are emptied for good; the reversible batch delete
    /// would just move them back into trash.
    pub fn requires_permanent_delete(&self) -> bool {
        matches!(self, Selector::Spam | Selector::Trash)
    }
}
