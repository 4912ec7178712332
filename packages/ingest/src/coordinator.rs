//! Sequential multi-page crawl for one keyword.

use std::sync::Arc;
use std::time::Duration;

use market_scan_ingest_models::{ProgressCallback, null_progress};
use market_scan_listing_models::ProductRecord;
use market_scan_scraper::PageFetcher;
use market_scan_scraper::extract::RecordExtractor;
use market_scan_scraper::site::PacingConfig;
use rand::Rng;

use crate::IngestError;
use crate::coerce::coerce;

/// Records gathered by one crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlResult {
    /// Coerced records in page order, then in-page order. May contain
    /// repeated titles.
    pub records: Vec<ProductRecord>,
    /// Pages whose fetch failed, ascending.
    pub failed_pages: Vec<u32>,
}

/// Drives a [`PageFetcher`] and a [`RecordExtractor`] across pages
/// `1..=max_pages`, pausing between fetches.
pub struct IngestionCoordinator<F> {
    fetcher: F,
    extractor: RecordExtractor,
    pacing: PacingConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl<F: PageFetcher> IngestionCoordinator<F> {
    #[must_use]
    pub fn new(fetcher: F, extractor: RecordExtractor, pacing: PacingConfig) -> Self {
        Self {
            fetcher,
            extractor,
            pacing,
            progress: null_progress(),
        }
    }

    /// Reports one unit of progress per page to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The wrapped fetcher, for inspecting recorded calls.
    #[cfg(test)]
    #[must_use]
    pub(crate) const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches and extracts every page, then coerces the records.
    ///
    /// A failed page is logged, recorded in
    /// [`CrawlResult::failed_pages`] and skipped. The pause before the next
    /// page still happens.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NoData`] if no page yielded a single record.
    pub async fn run(&self, keyword: &str, max_pages: u32) -> Result<CrawlResult, IngestError> {
        self.progress.set_total(u64::from(max_pages));

        let mut raw = Vec::new();
        let mut failed_pages = Vec::new();

        for page in 1..=max_pages {
            if page > 1 {
                self.pause().await;
            }
            self.progress
                .set_message(format!("{keyword}: page {page}/{max_pages}"));

            match self.fetcher.fetch_page(keyword, page).await {
                Ok(html) => {
                    let listings = self.extractor.extract(&html);
                    if listings.is_empty() {
                        log::warn!("{keyword}: page {page} has no results");
                    } else {
                        log::info!("{keyword}: page {page}: {} listings", listings.len());
                    }
                    raw.extend(listings);
                }
                Err(e) => {
                    log::warn!("{keyword}: page {page} failed: {e}");
                    failed_pages.push(page);
                }
            }

            self.progress.inc(1);
        }

        if raw.is_empty() {
            self.progress.finish_and_clear();
            return Err(IngestError::NoData {
                keyword: keyword.to_owned(),
                failed_pages,
            });
        }

        let records: Vec<ProductRecord> = raw.into_iter().map(coerce).collect();

        self.progress.finish(format!(
            "{keyword}: {} records from {} page(s)",
            records.len(),
            u64::from(max_pages) - failed_pages.len() as u64,
        ));

        Ok(CrawlResult {
            records,
            failed_pages,
        })
    }

    async fn pause(&self) {
        let (low, high) = self.pacing.bounds();
        if high == 0 {
            return;
        }
        let secs = rand::thread_rng().gen_range(low..=high);
        log::debug!("Waiting {secs}s before the next page");
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use market_scan_scraper::ScrapeError;
    use market_scan_scraper::site::find_site;

    use super::*;

    /// Serves canned pages; pages listed in `failing` answer 503.
    pub struct FakeFetcher {
        pages: BTreeMap<u32, String>,
        failing: Vec<u32>,
        pub calls: Mutex<Vec<u32>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self {
                pages: BTreeMap::new(),
                failing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn page(mut self, page: u32, titles: &[&str]) -> Self {
            self.pages.insert(page, results_page(titles));
            self
        }

        pub fn failing(mut self, pages: &[u32]) -> Self {
            self.failing = pages.to_vec();
            self
        }
    }

    impl PageFetcher for FakeFetcher {
        async fn fetch_page(&self, _keyword: &str, page: u32) -> Result<String, ScrapeError> {
            self.calls.lock().unwrap().push(page);
            if self.failing.contains(&page) {
                return Err(ScrapeError::Status {
                    status: 503,
                    url: format!("https://shop.example/s?page={page}"),
                });
            }
            Ok(self
                .pages
                .get(&page)
                .cloned()
                .unwrap_or_else(|| results_page(&[])))
        }
    }

    pub fn results_page(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|title| {
                format!(
                    r#"<div data-component-type="s-search-result">
                         <h2><span>{title}</span></h2>
                         <span class="a-offscreen">$12.99</span>
                         <span class="a-icon-alt">4.5 out of 5 stars</span>
                         <span class="a-size-base">1,024</span>
                       </div>"#
                )
            })
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    pub fn coordinator(
        fetcher: FakeFetcher,
        pacing: PacingConfig,
    ) -> IngestionCoordinator<FakeFetcher> {
        let extractor = RecordExtractor::new(&find_site("amazon_us").unwrap()).unwrap();
        IngestionCoordinator::new(fetcher, extractor, pacing)
    }

    fn titles(result: &CrawlResult) -> Vec<&str> {
        result.records.iter().map(|r| r.title.as_str()).collect()
    }

    // The per-page warning is checked through `failed_pages`, which is
    // filled at the same point the warning is logged.
    #[tokio::test]
    async fn failed_page_is_skipped_and_listed_in_failed_pages() {
        let fetcher = FakeFetcher::new()
            .page(1, &["a"])
            .page(2, &["b"])
            .page(3, &["c"])
            .page(4, &["d"])
            .page(5, &["e"])
            .failing(&[3]);
        let coordinator = coordinator(fetcher, PacingConfig::NONE);

        let result = coordinator.run("beer", 5).await.unwrap();

        assert_eq!(titles(&result), ["a", "b", "d", "e"]);
        assert_eq!(result.failed_pages, [3]);
        assert_eq!(*coordinator.fetcher.calls.lock().unwrap(), [1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn keeps_page_order_and_duplicates() {
        let fetcher = FakeFetcher::new()
            .page(1, &["x", "y"])
            .page(2, &["x", "z"]);
        let coordinator = coordinator(fetcher, PacingConfig::NONE);

        let result = coordinator.run("beer", 2).await.unwrap();

        assert_eq!(titles(&result), ["x", "y", "x", "z"]);
        assert!(result.failed_pages.is_empty());
    }

    #[tokio::test]
    async fn coerces_numeric_fields() {
        let fetcher = FakeFetcher::new().page(1, &["x"]);
        let coordinator = coordinator(fetcher, PacingConfig::NONE);

        let result = coordinator.run("beer", 1).await.unwrap();
        let record = &result.records[0];

        assert_eq!(record.price, Some(12.99));
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.review_count, Some(1024));
    }

    #[tokio::test]
    async fn no_records_is_no_data() {
        let fetcher = FakeFetcher::new().page(1, &[]).failing(&[2]);
        let coordinator = coordinator(fetcher, PacingConfig::NONE);

        let err = coordinator.run("beer", 2).await.unwrap_err();

        match err {
            IngestError::NoData {
                keyword,
                failed_pages,
            } => {
                assert_eq!(keyword, "beer");
                assert_eq!(failed_pages, [2]);
            }
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_pages_within_range() {
        let fetcher = FakeFetcher::new()
            .page(1, &["a"])
            .page(2, &["b"])
            .page(3, &["c"]);
        let coordinator = coordinator(fetcher, PacingConfig::default());

        let start = tokio::time::Instant::now();
        coordinator.run("beer", 3).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(4), "elapsed {elapsed:?}");
        assert!(elapsed <= Duration::from_secs(10), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_after_failed_page_too() {
        let fetcher = FakeFetcher::new()
            .page(1, &["a"])
            .page(3, &["c"])
            .failing(&[2]);
        let pacing = PacingConfig {
            min_secs: 3,
            max_secs: 3,
        };
        let coordinator = coordinator(fetcher, pacing);

        let start = tokio::time::Instant::now();
        coordinator.run("beer", 3).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(7), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn single_page_does_not_pause() {
        let fetcher = FakeFetcher::new().page(1, &["a"]);
        let coordinator = coordinator(fetcher, PacingConfig::default());

        let start = tokio::time::Instant::now();
        coordinator.run("beer", 1).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
