//! HTTP page fetcher.
//!
//! Issues one GET per results page against the site's search endpoint with
//! the site's fixed headers. Anything other than a 2xx answer is an error;
//! there is no retry.

use crate::site::SiteDefinition;
use crate::{PageFetcher, ScrapeError};

/// Fetches search result pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    search_url: reqwest::Url,
    keyword_param: String,
    page_param: String,
}

impl HttpPageFetcher {
    /// Builds a fetcher for the given site, baking the site's headers into
    /// the client.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if a header or the search URL is invalid, or
    /// the HTTP client cannot be built.
    pub fn new(site: &SiteDefinition) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_client(site)?,
            search_url: site.search_url()?,
            keyword_param: site.keyword_param.clone(),
            page_param: site.page_param.clone(),
        })
    }

    /// The URL that [`PageFetcher::fetch_page`] requests for `keyword` and
    /// `page`.
    #[must_use]
    pub fn page_url(&self, keyword: &str, page: u32) -> reqwest::Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.keyword_param, keyword)
            .append_pair(&self.page_param, &page.to_string());
        url
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String, ScrapeError> {
        let url = self.page_url(keyword, page);
        log::debug!("GET {url}");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Builds a [`reqwest::Client`] with the site's headers as defaults.
fn build_client(site: &SiteDefinition) -> Result<reqwest::Client, ScrapeError> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in &site.headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ScrapeError::Parse(format!("invalid header name '{key}': {e}")))?;
        let val = reqwest::header::HeaderValue::from_str(value)
            .map_err(|e| ScrapeError::Parse(format!("invalid header value '{value}': {e}")))?;
        header_map.insert(name, val);
    }
    reqwest::Client::builder()
        .default_headers(header_map)
        .build()
        .map_err(ScrapeError::Http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{DEFAULT_SITE_ID, find_site};

    #[test]
    fn page_url_encodes_keyword_and_page() {
        let site = find_site(DEFAULT_SITE_ID).unwrap();
        let fetcher = HttpPageFetcher::new(&site).unwrap();

        let url = fetcher.page_url("craft beer & cider", 3);
        assert_eq!(
            url.as_str(),
            "https://www.amazon.com/s?k=craft+beer+%26+cider&page=3"
        );
    }

    #[test]
    fn rejects_invalid_header_name() {
        let mut site = find_site(DEFAULT_SITE_ID).unwrap();
        site.headers.insert("Bad Header".to_owned(), "x".to_owned());
        assert!(matches!(
            HttpPageFetcher::new(&site),
            Err(ScrapeError::Parse(_))
        ));
    }
}
