//! Add-to-cart workflow

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{nth, Page, WaitState};
use crate::retry::{wait_until, with_retry};

use super::{navigate_and_wait, page_url, pause, scroll_to, TesterTimings};

pub const PRODUCT_CARD: &str = r#"[data-testid^="product-card-"]"#;
pub const ADD_TO_CART_BUTTON: &str = r#"[data-testid^="add-to-cart-button-"]"#;
pub const CART_BADGE: &str = r#"[data-testid="cart-badge"]"#;
pub const CART_LINK: &str = r#"[data-testid="cart-link"]"#;

fn product_card(id: &str) -> String {
    format!(r#"[data-testid="product-card-{}"]"#, id)
}

fn add_button(id: &str) -> String {
    format!(r#"[data-testid="add-to-cart-button-{}"]"#, id)
}

fn product_title(id: &str) -> String {
    format!(r#"[data-testid="product-title-{}"]"#, id)
}

fn product_price(id: &str) -> String {
    format!(r#"[data-testid="product-current-price-{}"]"#, id)
}

/// Parse badge text such as `3` or `99+`
pub fn parse_badge_count(text: &str) -> u32 {
    let digits: String = text
        .trim()
        .trim_end_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInfo {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddition {
    pub product: ProductInfo,
    pub initial_count: u32,
    pub new_count: u32,
}

/// Per-index outcome of a batch addition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartAttempt {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addition: Option<CartAddition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct AddToCartTester<'a> {
    page: &'a dyn Page,
    base_url: String,
    timings: TesterTimings,
}

impl<'a> AddToCartTester<'a> {
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

    pub async fn navigate(&self) -> E2eResult<()> {
        navigate_and_wait(
            self.page,
            &page_url(&self.base_url, "/products"),
            Some(PRODUCT_CARD),
            &self.timings,
        )
        .await
    }

    /// Read the `index`-th (0-based) product card of the listing
    pub async fn get_product_info(&self, index: usize) -> E2eResult<ProductInfo> {
        let cards = self.page.count(PRODUCT_CARD).await?;
        if cards == 0 {
            return Err(E2eError::NoProductsFound);
        }
        if index >= cards {
            return Err(E2eError::ElementNotFound(format!(
                "product card {} (listing has {})",
                index, cards
            )));
        }

        let card = nth(PRODUCT_CARD, index);
        let id = self
            .page
            .get_attribute(&card, "data-product-id")
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(format!("data-product-id on product card {}", index)))?;

        let title = self.page.text_content(&product_title(&id)).await?;
        let name = match self.page.get_attribute(&card, "data-product-name").await? {
            Some(name) if !name.is_empty() => name,
            _ => title.unwrap_or_default().trim().to_string(),
        };
        let price = self
            .page
            .text_content(&product_price(&id))
            .await?
            .map(|p| p.trim().to_string());

        Ok(ProductInfo { index, id, name, price })
    }

    /// Badge count; 0 whenever the badge is absent or unreadable
    pub async fn get_cart_count(&self) -> u32 {
        match self.read_badge().await {
            Ok(count) => count,
            Err(e) => {
                debug!("Cart badge unreadable, assuming 0: {}", e);
                0
            }
        }
    }

    async fn read_badge(&self) -> E2eResult<u32> {
        if !self.page.is_visible(CART_BADGE).await? {
            return Ok(0);
        }
        let text = self.page.text_content(CART_BADGE).await?.unwrap_or_default();
        Ok(parse_badge_count(&text))
    }

    /// Click add-to-cart and wait until the badge count rises above its prior value
    pub async fn add_product_to_cart(&self, index: usize) -> E2eResult<CartAddition> {
        let product = self.get_product_info(index).await?;
        let initial_count = self.get_cart_count().await;

        scroll_to(self.page, &product_card(&product.id), &self.timings).await?;
        let button = add_button(&product.id);
        self.page
            .wait_for_selector(&button, WaitState::Visible, self.timings.element)
            .await?;

        let product_id = product.id.as_str();
        let button = button.as_str();
        with_retry(&self.timings.retry, |attempt| async move {
            debug!("Adding product {} to cart (attempt {})", product_id, attempt);
            self.page.click(button).await?;
            wait_until(
                "cart badge count to increase",
                self.timings.cart_update,
                self.timings.poll_interval,
                move || async move { self.get_cart_count().await > initial_count },
            )
            .await
        })
        .await?;

        let new_count = self.get_cart_count().await;
        info!("Added '{}' to cart ({} -> {})", product.name, initial_count, new_count);
        Ok(CartAddition {
            product,
            initial_count,
            new_count,
        })
    }

    pub async fn verify_cart_count(&self, expected: u32) -> E2eResult<u32> {
        let actual = self.get_cart_count().await;
        if actual != expected {
            return Err(E2eError::AssertionFailed(format!(
                "cart count is {}, expected {}",
                actual, expected
            )));
        }
        if expected > 0 && !self.page.is_visible(CART_BADGE).await? {
            return Err(E2eError::AssertionFailed("cart badge is not visible".into()));
        }
        Ok(actual)
    }

    /// Add products `0..count` one after another; failures are recorded, not raised
    pub async fn test_multiple_products(&self, count: usize) -> Vec<CartAttempt> {
        let mut attempts = Vec::with_capacity(count);
        for index in 0..count {
            match self.add_product_to_cart(index).await {
                Ok(addition) => {
                    attempts.push(CartAttempt {
                        index,
                        success: true,
                        addition: Some(addition),
                        error: None,
                    });
                    pause(self.timings.pacing).await;
                }
                Err(e) => {
                    warn!("Adding product {} failed: {}", index, e);
                    attempts.push(CartAttempt {
                        index,
                        success: false,
                        addition: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        attempts
    }
}
