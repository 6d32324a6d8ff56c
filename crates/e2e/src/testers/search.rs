//! Product search workflows

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::page::{Page, WaitState};

use super::{navigate_and_wait, page_url, pause, wait_for_page_load, TesterTimings};

pub const HEADER_SEARCH: &str = r#"[data-testid="header-search-input"]"#;
pub const MOBILE_SEARCH_TOGGLE: &str = r#"[data-testid="mobile-search-toggle"]"#;
pub const MOBILE_SEARCH_INPUT: &str = r#"[data-testid="mobile-search-input"]"#;
pub const PRODUCTS_SEARCH_INPUT: &str = r#"[data-testid="products-search-input"]"#;
pub const PRODUCTS_GRID: &str = r#"[data-testid="products-grid"]"#;
pub const NO_PRODUCTS_MESSAGE: &str = r#"[data-testid="no-products-message"]"#;
pub const RESULTS_COUNT: &str = r#"[data-testid="results-count"]"#;
pub const CATEGORY_FILTER: &str = r#"[data-testid="category-filter"]"#;
pub const PRICE_RANGE_SLIDER: &str = r#"[data-testid="price-range-slider"]"#;

const GRID_CARDS: &str = r#"[data-testid="products-grid"] [data-testid^="product-card-"]"#;
const GRID_TITLES: &str = r#"[data-testid="products-grid"] [data-testid^="product-title-"]"#;
const ANY_CARD: &str = r#"[data-testid^="product-card-"]"#;

const PRODUCTS_URL_PATTERN: &str = "**/products**";

/// Viewport below the storefront's mobile breakpoint
pub const MOBILE_VIEWPORT: (u32, u32) = (375, 667);

pub const FILTER_CATEGORY: &str = "Electronics";
pub const FILTER_PRICE: &str = "500";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub search_term: String,
    pub result_count: usize,
    pub has_results: bool,
    pub has_no_results_message: bool,
    pub product_titles: Vec<String>,
    pub relevant_count: usize,
    /// Share of result titles containing the term; 0 with no results
    pub relevance_ratio: f64,
}

impl SearchOutcome {
    /// Results or an explicit no-results indicator; neither means the page is broken
    pub fn is_conclusive(&self) -> bool {
        self.has_results || self.has_no_results_message
    }

    fn from_observation(term: &str, result_count: usize, titles: Vec<String>, no_results_message: bool) -> Self {
        let needle = term.to_lowercase();
        let relevant_count = titles
            .iter()
            .filter(|t| t.to_lowercase().contains(&needle))
            .count();
        let relevance_ratio = if result_count > 0 {
            relevant_count as f64 / result_count as f64
        } else {
            0.0
        };

        Self {
            search_term: term.to_string(),
            result_count,
            has_results: result_count > 0,
            has_no_results_message: no_results_message,
            product_titles: titles,
            relevant_count,
            relevance_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReading {
    pub count: usize,
    pub display_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    pub category_filter: FilterReading,
    pub price_filter: FilterReading,
}

pub struct SearchTester<'a> {
    page: &'a dyn Page,
    base_url: String,
    timings: TesterTimings,
}

impl<'a> SearchTester<'a> {
    pub fn new(page: &'a dyn Page, base_url: impl Into<String>) -> Self {
        Self::with_timings(page, base_url, TesterTimings::default())
    }

    pub fn with_timings(page: &'a dyn Page, base_url: impl Into<String>, timings: TesterTimings) -> Self {
        Self {
            page,
            base_url: base_url.into(),
            timings,
        }
    }

    async fn submit_and_follow(&self, input: &str, term: &str) -> E2eResult<SearchOutcome> {
        self.page.fill(input, term).await?;
        self.page.press(input, "Enter").await?;
        self.page
            .wait_for_url(PRODUCTS_URL_PATTERN, self.timings.navigation)
            .await?;
        wait_for_page_load(self.page, &self.timings).await?;
        self.verify_search_results(term).await
    }

    /// Search from the desktop header
    pub async fn test_header_search(&self, term: &str) -> E2eResult<SearchOutcome> {
        navigate_and_wait(self.page, &page_url(&self.base_url, "/"), None, &self.timings).await?;
        if !self.page.is_visible(HEADER_SEARCH).await? {
            return Err(E2eError::ElementNotFound("header search is not visible".into()));
        }
        self.submit_and_follow(HEADER_SEARCH, term).await
    }

    /// Search from the collapsed mobile header
    pub async fn test_mobile_search(&self, term: &str) -> E2eResult<SearchOutcome> {
        let (width, height) = MOBILE_VIEWPORT;
        self.page.set_viewport(width, height).await?;
        navigate_and_wait(self.page, &page_url(&self.base_url, "/"), None, &self.timings).await?;

        self.page.click(MOBILE_SEARCH_TOGGLE).await?;
        self.page
            .wait_for_selector(MOBILE_SEARCH_INPUT, WaitState::Visible, self.timings.element)
            .await?;
        self.submit_and_follow(MOBILE_SEARCH_INPUT, term).await
    }

    /// Search from the products page filter box
    pub async fn test_products_page_search(&self, term: &str) -> E2eResult<SearchOutcome> {
        navigate_and_wait(self.page, &page_url(&self.base_url, "/products"), None, &self.timings).await?;
        self.page.fill(PRODUCTS_SEARCH_INPUT, term).await?;
        // The listing filters on a debounce.
        pause(self.timings.settle).await;
        self.verify_search_results(term).await
    }

    pub async fn verify_search_results(&self, term: &str) -> E2eResult<SearchOutcome> {
        let result_count = self.page.count(GRID_CARDS).await?;
        let no_results_message = self.page.is_visible(NO_PRODUCTS_MESSAGE).await?;

        let titles = if result_count > 0 {
            self.page.all_text_contents(GRID_TITLES).await?
        } else {
            Vec::new()
        };

        let outcome = SearchOutcome::from_observation(term, result_count, titles, no_results_message);
        info!(
            "Search '{}': {} results, {} relevant",
            term, outcome.result_count, outcome.relevant_count
        );
        Ok(outcome)
    }

    /// Apply the category filter, then the price filter, reading the listing after each
    pub async fn test_search_filters(&self) -> E2eResult<FilterOutcome> {
        navigate_and_wait(self.page, &page_url(&self.base_url, "/products"), None, &self.timings).await?;

        self.page.select_option(CATEGORY_FILTER, FILTER_CATEGORY).await?;
        pause(self.timings.settle).await;
        let category_filter = self.filtered_results().await?;

        self.page.fill(PRICE_RANGE_SLIDER, FILTER_PRICE).await?;
        pause(self.timings.settle).await;
        let price_filter = self.filtered_results().await?;

        Ok(FilterOutcome {
            category_filter,
            price_filter,
        })
    }

    async fn filtered_results(&self) -> E2eResult<FilterReading> {
        let reading = FilterReading {
            count: self.page.count(ANY_CARD).await?,
            display_text: self.page.text_content(RESULTS_COUNT).await?,
        };
        debug!("Filtered listing: {:?}", reading);
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relevance_is_case_insensitive() {
        let outcome = SearchOutcome::from_observation(
            "Laptop",
            3,
            titles(&["Gaming LAPTOP", "laptop stand", "Mouse"]),
            false,
        );
        assert_eq!(outcome.relevant_count, 2);
        assert!((outcome.relevance_ratio - 2.0 / 3.0).abs() < f64::EPSILON);
        assert!(outcome.is_conclusive());
    }

    #[test]
    fn test_no_results_has_zero_ratio() {
        let outcome = SearchOutcome::from_observation("zzznomatch", 0, Vec::new(), true);
        assert_eq!(outcome.relevance_ratio, 0.0);
        assert!(!outcome.has_results);
        assert!(outcome.is_conclusive());

        let broken = SearchOutcome::from_observation("x", 0, Vec::new(), false);
        assert!(!broken.is_conclusive());
    }
}
