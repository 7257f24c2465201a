use crate::mailbox::MailboxClient;

/// Ids requested per list page; Gmail caps a list page at 500.
const PAGE_SIZE: u32 = 500;

/// Resolve a search query into the complete list of matching message ids by
/// following the provider's continuation cursor.
///
/// Best-effort: a page failure stops pagination and whatever accumulated so
/// far is returned, so callers must not treat the result as authoritative
/// under provider failure.
pub async fn resolve_ids(client: &dyn MailboxClient, query: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = match client
            .list_messages(query, PAGE_SIZE, page_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(
                    "Listing '{}' failed after {} ids: {}",
                    query,
                    ids.len(),
                    err
                );
                break;
            }
        };

        ids.extend(page.ids);
        page_token = page.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    ids
}
