//! Paged Listing Driver
//!
//! Drives a filer's paged volume listing to completion. Pages are accounted
//! strictly in delivery order: a page-level error or the page cap stops
//! fetching, and whatever was accumulated before that point is returned.

use crate::domain::ports::{PageControl, RawVolumePage, VolumePager};
use crate::error::Result;
use crate::filer::query::AttributeQuery;
use tracing::{debug, info, warn};

/// Collect all pages of a volume listing
///
/// `max_pages <= 0` means unbounded. Only a connection fault is returned as
/// an error; a page carrying an error is logged and truncates the listing.
pub async fn list_all_pages<P>(
    pager: &P,
    query: &AttributeQuery,
    max_pages: i64,
) -> Result<Vec<RawVolumePage>>
where
    P: VolumePager + ?Sized,
{
    let mut pages = Vec::new();
    let mut page_count: i64 = 0;

    let mut handler = |page: RawVolumePage| {
        if let Some(error) = &page.error {
            warn!(
                code = %error.code,
                reason = %error.reason,
                pages = page_count,
                "volume listing failed mid-stream, keeping pages received so far"
            );
            return PageControl::Stop;
        }

        debug!(page = page_count, entries = page.entries.len(), "received volume page");
        pages.push(page);
        page_count += 1;

        if max_pages > 0 && page_count >= max_pages {
            info!(max_pages, "volume page limit reached");
            return PageControl::Stop;
        }
        PageControl::Continue
    };

    pager.list_volumes(query, &mut handler).await?;

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::filer::testing::{entry, StaticPager};
    use assert_matches::assert_matches;

    fn pages(count: usize) -> Vec<RawVolumePage> {
        (0..count)
            .map(|i| RawVolumePage::new(vec![entry(&format!("vol_{}", i), "")]))
            .collect()
    }

    #[tokio::test]
    async fn test_unbounded_reads_all_pages() {
        let pager = StaticPager::new(pages(7));
        let query = AttributeQuery::new(1, None);

        let result = list_all_pages(&pager, &query, 0).await.unwrap();
        assert_eq!(result.len(), 7);
        assert_eq!(pager.delivered(), 7);

        let result = list_all_pages(&pager, &query, -1).await.unwrap();
        assert_eq!(result.len(), 7);
    }

    #[tokio::test]
    async fn test_page_cap() {
        let pager = StaticPager::new(pages(10));
        let query = AttributeQuery::new(1, None);

        let result = list_all_pages(&pager, &query, 3).await.unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(pager.delivered(), 3);
        assert_eq!(result[2].entries[0].id.name, "vol_2");
    }

    #[tokio::test]
    async fn test_page_cap_above_available() {
        let pager = StaticPager::new(pages(2));
        let query = AttributeQuery::new(1, None);

        let result = list_all_pages(&pager, &query, 5).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_stops_at_first_page_error() {
        let mut source = pages(2);
        source.push(RawVolumePage::failed("13001", "reason"));
        source.extend(pages(3));
        let pager = StaticPager::new(source);
        let query = AttributeQuery::new(1, None);

        let result = list_all_pages(&pager, &query, 0).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.error.is_none()));
        assert_eq!(pager.delivered(), 3);
    }

    #[tokio::test]
    async fn test_error_on_first_page_yields_nothing() {
        let mut source = vec![RawVolumePage::failed("1", "busy")];
        source.extend(pages(2));
        let pager = StaticPager::new(source);

        let result = list_all_pages(&pager, &AttributeQuery::new(1, None), 0)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_connection_fault_propagates() {
        let pager = StaticPager::unreachable();

        let result = list_all_pages(&pager, &AttributeQuery::new(1, None), 0).await;
        assert_matches!(result, Err(Error::Connection { .. }));
    }
}
