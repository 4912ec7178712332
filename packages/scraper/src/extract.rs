//! Product listing extraction from a results page.
//!
//! Locates every result container via CSS selector and pulls each field
//! out of it independently. A field whose selector matches nothing (or
//! matches an element with no text) is `None`; it never stops extraction
//! of the other fields or the other containers.
//!
//! Numeric-looking fields stay text here. Coercion is the caller's job.

use market_scan_listing_models::{RawListing, TITLE_PLACEHOLDER};
use scraper::{ElementRef, Html, Selector};

use crate::ScrapeError;
use crate::site::SiteDefinition;

/// Compiled selectors for one site.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    base: reqwest::Url,
    currency_symbol: String,
    container: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    reviews: Selector,
    image: Selector,
    link: Selector,
}

impl RecordExtractor {
    /// Compiles the site's selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if any selector or the base URL is
    /// invalid.
    pub fn new(site: &SiteDefinition) -> Result<Self, ScrapeError> {
        let selectors = &site.selectors;
        Ok(Self {
            base: site.base()?,
            currency_symbol: site.currency_symbol.clone(),
            container: parse_selector(&selectors.container)?,
            title: parse_selector(&selectors.title)?,
            price: parse_selector(&selectors.price)?,
            rating: parse_selector(&selectors.rating)?,
            reviews: parse_selector(&selectors.reviews)?,
            image: parse_selector(&selectors.image)?,
            link: parse_selector(&selectors.link)?,
        })
    }

    /// Extracts every listing on the page, in document order.
    ///
    /// Returns an empty vec when the page has no result containers.
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);
        document
            .select(&self.container)
            .map(|container| self.extract_listing(container))
            .collect()
    }

    fn extract_listing(&self, container: ElementRef<'_>) -> RawListing {
        let title = first_text(container, &self.title)
            .unwrap_or_else(|| TITLE_PLACEHOLDER.to_owned());

        let price = first_text(container, &self.price).map(|text| {
            if self.currency_symbol.is_empty() {
                text
            } else {
                text.replace(&self.currency_symbol, "").trim().to_owned()
            }
        });

        let rating = first_text(container, &self.rating)
            .and_then(|text| text.split_whitespace().next().map(ToOwned::to_owned));

        let reviews = first_text(container, &self.reviews).map(|text| text.replace(',', ""));

        let image_url = first_attr(container, &self.image, "src");

        let product_url = first_attr(container, &self.link, "href").and_then(|href| {
            self.base
                .join(&href)
                .map(String::from)
                .inspect_err(|e| log::debug!("Unresolvable product link '{href}': {e}"))
                .ok()
        });

        RawListing {
            title,
            price,
            rating,
            reviews,
            image_url,
            product_url,
        }
    }
}

/// Whitespace-collapsed text of the first element matching `selector`.
fn first_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = container.select(selector).next()?;
    let text = element.text().collect::<String>();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Trimmed attribute value of the first element matching `selector`.
fn first_attr(container: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    let value = container.select(selector).next()?.value().attr(attr)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::Parse(format!("invalid CSS selector '{selector}': {e}")))
}
