//! Bucket listing.

use crate::error::SyncError;
use crate::store::ObjectStore;
use crate::types::RemoteObject;
use tracing::{debug, info};

/// Lists every object under `prefix` in `bucket`.
///
/// Pages are requested one after another, each carrying the continuation
/// token of the previous one, until a page reports no truncation. The full
/// set is collected before returning so the worker pool starts from a fixed
/// queue. Entries without a key are dropped.
///
/// # Arguments
///
/// * `store` - Object store to query
/// * `bucket` - Bucket name
/// * `prefix` - Key prefix, empty for the whole bucket
///
/// # Returns
///
/// All listed objects, or the first request error. Listing is not retried.
pub async fn list_all(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<RemoteObject>, SyncError> {
    let mut all_objects = Vec::new();
    let mut continuation_token: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        let page = store
            .list_page(bucket, prefix, continuation_token.as_deref())
            .await?;
        page_count += 1;

        all_objects.extend(page.entries.into_iter().filter_map(|entry| {
            let key = entry.key.filter(|k| !k.is_empty())?;
            Some(RemoteObject::new(key, entry.size))
        }));
        debug!(
            "Listed page {} ({} objects so far)",
            page_count,
            all_objects.len()
        );

        if !page.is_truncated {
            break;
        }

        continuation_token = match page.next_continuation_token {
            Some(token) => Some(token),
            None => {
                return Err(SyncError::Store(format!(
                    "Listing page {} of bucket {} is truncated but has no continuation token",
                    page_count, bucket
                )))
            }
        };
    }

    info!(
        "Listed {} objects from {} page(s) of bucket {}",
        all_objects.len(),
        page_count,
        bucket
    );
    Ok(all_objects)
}
