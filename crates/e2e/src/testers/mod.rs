//! High-level storefront workflows driven through a [`Page`]
//!
//! Each tester owns a borrowed page plus the base URL and exposes verbs such
//! as "fill the contact form" or "add product 2 to the cart" instead of raw
//! element queries. Flaky UI state is handled with [`crate::retry`].

use std::time::Duration;

use tracing::debug;

use crate::error::E2eResult;
use crate::page::{LoadState, Page, WaitState};
use crate::retry::RetryPolicy;

pub mod cart;
pub mod contact;
pub mod search;

pub use cart::{AddToCartTester, CartAddition, CartAttempt, ProductInfo};
pub use contact::{ContactFormTester, SubmissionCheck, ValidationCheck};
pub use search::{FilterOutcome, FilterReading, SearchOutcome, SearchTester};

/// Bounds and pacing shared by all testers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TesterTimings {
    /// Each of the two load-state waits after navigation
    pub navigation: Duration,
    /// Landmark and element visibility waits
    pub element: Duration,
    /// Contact form success message
    pub success: Duration,
    /// Contact form loading indicator
    pub loading: Duration,
    /// Cart badge increase after an add-to-cart click
    pub cart_update: Duration,
    pub poll_interval: Duration,
    /// Pause after each successful addition in a batch
    pub pacing: Duration,
    /// Pause after a search input or filter change
    pub settle: Duration,
    pub scroll_settle: Duration,
    pub retry: RetryPolicy,
}

impl Default for TesterTimings {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(10),
            element: Duration::from_secs(10),
            success: Duration::from_secs(5),
            loading: Duration::from_secs(2),
            cart_update: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            pacing: Duration::from_secs(1),
            settle: Duration::from_secs(1),
            scroll_settle: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        }
    }
}

impl TesterTimings {
    /// Millisecond-scale timings for exercising testers against scripted pages
    pub fn instant() -> Self {
        Self {
            navigation: Duration::from_millis(50),
            element: Duration::from_millis(50),
            success: Duration::from_millis(50),
            loading: Duration::from_millis(20),
            cart_update: Duration::from_millis(50),
            poll_interval: Duration::from_millis(1),
            pacing: Duration::ZERO,
            settle: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
        }
    }
}

/// Join a base URL and an absolute path without doubling slashes
pub(crate) fn page_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Navigate, wait for network-idle and DOM-content-loaded, then the landmark
pub async fn navigate_and_wait(
    page: &dyn Page,
    url: &str,
    landmark: Option<&str>,
    timings: &TesterTimings,
) -> E2eResult<()> {
    debug!("Navigating to {}", url);
    page.goto(url, timings.navigation).await?;
    wait_for_page_load(page, timings).await?;
    if let Some(selector) = landmark {
        page.wait_for_selector(selector, WaitState::Visible, timings.element)
            .await?;
    }
    Ok(())
}

pub(crate) async fn wait_for_page_load(page: &dyn Page, timings: &TesterTimings) -> E2eResult<()> {
    page.wait_for_load_state(LoadState::NetworkIdle, timings.navigation)
        .await?;
    page.wait_for_load_state(LoadState::DomContentLoaded, timings.navigation)
        .await
}

pub(crate) async fn scroll_to(page: &dyn Page, selector: &str, timings: &TesterTimings) -> E2eResult<()> {
    page.scroll_into_view(selector).await?;
    pause(timings.scroll_settle).await;
    Ok(())
}

pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
