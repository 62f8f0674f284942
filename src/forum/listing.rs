use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

static LISTING_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.taolun_leftright").expect("Invalid selector"));
static THREAD_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.news1[href]").expect("Invalid selector"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("page has no thread listing")]
    MissingListing,
}

/// A thread entry from the board listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub title: String,
    pub link: Url,
}

/// Extract thread links from a board listing page, in listing order.
///
/// Only the first listing cell is read. Links that cannot be resolved against
/// `base_url` are skipped.
///
/// # Errors
///
/// Returns [`ListingError::MissingListing`] if the page has no listing cell.
pub fn extract_thread_links(
    html: &str,
    base_url: &Url,
) -> Result<Vec<ThreadSummary>, ListingError> {
    let document = Html::parse_document(html);
    let cell = document
        .select(&LISTING_CELL)
        .next()
        .ok_or(ListingError::MissingListing)?;

    let threads = cell
        .select(&THREAD_LINK)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let link = match base_url.join(href) {
                Ok(link) => link,
                Err(e) => {
                    debug!(href = %href, "Skipping unresolvable thread link: {e}");
                    return None;
                }
            };
            Some(ThreadSummary {
                title: anchor.text().collect::<String>().trim().to_string(),
                link,
            })
        })
        .collect();

    Ok(threads)
}
