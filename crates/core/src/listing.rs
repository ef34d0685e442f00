//! Marker-based listing pagination
//!
//! Each page request carries the last key seen so far as its marker; the loop
//! ends on the first page the store does not mark as truncated.

use std::future::Future;

use crate::error::{Error, Result};

/// One page of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Keys in store order
    pub keys: Vec<String>,

    /// Whether more keys are available after this page
    pub truncated: bool,
}

/// Fetch every page through `fetch_page` and concatenate the keys
///
/// `fetch_page` receives the marker for the next request (`None` for the
/// first). Any failing page fails the whole listing.
pub async fn collect_keys<F, Fut>(mut fetch_page: F) -> Result<Vec<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListPage>>,
{
    let mut keys: Vec<String> = Vec::new();
    let mut marker: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(marker.clone()).await?;
        pages += 1;

        let page_len = page.keys.len();
        keys.extend(page.keys);

        if !page.truncated {
            break;
        }

        // A truncated page without keys would repeat the same request forever
        if page_len == 0 {
            return Err(Error::General(
                "listing reported more results but returned no keys".into(),
            ));
        }

        marker = keys.last().cloned();
    }

    tracing::debug!(pages, keys = keys.len(), "listing complete");
    Ok(keys)
}
