//! Scripted in-memory storefront implementing `Page`
//!
//! Models just enough of the Yapee storefront for the testers: a contact
//! form, a product listing with a cart badge, and search plus filters.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use yapee_qa_e2e::page::{LoadState, Page, WaitState};
use yapee_qa_e2e::setup::{HEADER_SELECTOR, MAIN_SELECTOR};
use yapee_qa_e2e::testers::{cart, contact, search};
use yapee_qa_e2e::{E2eError, E2eResult};

pub const BASE_URL: &str = "http://storefront.test";

const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: u32,
}

impl Product {
    pub fn new(id: &str, name: &str, category: &str, price: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price,
        }
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        Product::new("101", "Laptop Pro 14", "Electronics", 1200),
        Product::new("102", "Gaming Laptop", "Electronics", 450),
        Product::new("103", "Wireless Mouse", "Electronics", 25),
        Product::new("201", "Cotton T-Shirt", "Clothing", 15),
    ]
}

#[derive(Debug)]
struct State {
    url: String,
    viewport: (u32, u32),
    landmarks: bool,
    fields: HashMap<String, String>,
    dropped_field: Option<String>,
    submit_failures: u32,
    submitted: bool,
    products: Vec<Product>,
    cart: u32,
    broken_buttons: HashSet<String>,
    badge_unreadable: bool,
    mobile_search_open: bool,
    search_term: Option<String>,
    category: Option<String>,
    max_price: Option<u32>,
    clicks: Vec<String>,
}

pub struct FakeStorefront {
    state: Mutex<State>,
}

impl FakeStorefront {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                url: String::new(),
                viewport: (1280, 720),
                landmarks: true,
                fields: HashMap::new(),
                dropped_field: None,
                submit_failures: 0,
                submitted: false,
                products: catalog(),
                cart: 0,
                broken_buttons: HashSet::new(),
                badge_unreadable: false,
                mobile_search_open: false,
                search_term: None,
                category: None,
                max_price: None,
                clicks: Vec::new(),
            }),
        }
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.state.lock().unwrap().products = products;
        self
    }

    pub fn without_landmarks(self) -> Self {
        self.state.lock().unwrap().landmarks = false;
        self
    }

    /// Typing into `selector` is silently lost
    pub fn dropping_input(self, selector: &str) -> Self {
        self.state.lock().unwrap().dropped_field = Some(selector.to_string());
        self
    }

    /// The first `n` valid submit clicks do nothing
    pub fn failing_submits(self, n: u32) -> Self {
        self.state.lock().unwrap().submit_failures = n;
        self
    }

    /// The add-to-cart button of product `id` does nothing
    pub fn broken_add_button(self, id: &str) -> Self {
        self.state.lock().unwrap().broken_buttons.insert(id.to_string());
        self
    }

    /// Every read of the cart badge errors, as with a detached element
    pub fn unreadable_badge(self) -> Self {
        self.state.lock().unwrap().badge_unreadable = true;
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn cart_count(&self) -> u32 {
        self.state.lock().unwrap().cart
    }

    pub fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.state.lock().unwrap().viewport
    }

    fn visible_products(state: &State) -> Vec<Product> {
        state
            .products
            .iter()
            .filter(|p| match &state.search_term {
                Some(term) => p.name.to_lowercase().contains(&term.to_lowercase()),
                None => true,
            })
            .filter(|p| state.category.as_ref().map_or(true, |c| &p.category == c))
            .filter(|p| state.max_price.map_or(true, |max| p.price <= max))
            .cloned()
            .collect()
    }

    fn path(state: &State) -> String {
        state
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&state.url)
            .split('?')
            .next()
            .unwrap_or("")
            .to_string()
    }

    fn visible(state: &State, selector: &str) -> bool {
        let on_contact = Self::path(state) == "/contact";
        let mobile = state.viewport.0 < MOBILE_BREAKPOINT;
        match selector {
            contact::CONTAINER | contact::FORM => on_contact,
            contact::SUCCESS_MESSAGE => state.submitted,
            contact::LOADING_TEXT => false,
            cart::CART_BADGE => state.cart > 0,
            search::HEADER_SEARCH => !mobile,
            search::MOBILE_SEARCH_INPUT => state.mobile_search_open,
            search::NO_PRODUCTS_MESSAGE => Self::visible_products(state).is_empty(),
            cart::PRODUCT_CARD => !Self::visible_products(state).is_empty(),
            other => match product_id(other, "add-to-cart-button-") {
                Some(id) => state.products.iter().any(|p| p.id == id),
                None => false,
            },
        }
    }
}

impl Default for FakeStorefront {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the id from `[data-testid="<prefix><id>"]`
fn product_id(selector: &str, prefix: &str) -> Option<String> {
    let start = format!(r#"[data-testid="{}"#, prefix);
    selector
        .strip_prefix(&start)?
        .strip_suffix("\"]")
        .map(|id| id.to_string())
}

/// Index from `<selector> >> nth=<i>`
fn nth_index(selector: &str) -> Option<usize> {
    selector.rsplit_once(">> nth=")?.1.parse().ok()
}

#[async_trait]
impl Page for FakeStorefront {
    async fn goto(&self, url: &str, _timeout: Duration) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.search_term = None;
        state.category = None;
        state.max_price = None;
        Ok(())
    }

    async fn wait_for_load_state(&self, _state: LoadState, _timeout: Duration) -> E2eResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()> {
        let visible = Self::visible(&self.state.lock().unwrap(), selector);
        let satisfied = match state {
            WaitState::Visible | WaitState::Attached => visible,
            WaitState::Hidden | WaitState::Detached => !visible,
        };
        if satisfied {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        Err(E2eError::Timeout(format!("{} to be {}", selector, state.as_str())))
    }

    async fn wait_for_url(&self, pattern: &str, _timeout: Duration) -> E2eResult<()> {
        let path = Self::path(&self.state.lock().unwrap());
        if pattern.contains("products") && path == "/products" {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("url {}", pattern)))
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.dropped_field.as_deref() == Some(selector) {
            return Ok(());
        }
        match selector {
            search::PRODUCTS_SEARCH_INPUT => state.search_term = Some(value.to_string()),
            search::PRICE_RANGE_SLIDER => state.max_price = value.parse().ok(),
            _ => {
                state.fields.insert(selector.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    async fn input_value(&self, selector: &str) -> E2eResult<String> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .fields
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());

        match selector {
            contact::SUBMIT_BUTTON => {
                let filled = |s: &State, f: &str| s.fields.get(f).map_or(false, |v| !v.is_empty());
                if filled(&*state, contact::NAME_FIELD) && filled(&*state, contact::EMAIL_FIELD) {
                    if state.submit_failures > 0 {
                        state.submit_failures -= 1;
                    } else {
                        state.submitted = true;
                    }
                }
                Ok(())
            }
            search::MOBILE_SEARCH_TOGGLE => {
                if state.viewport.0 >= MOBILE_BREAKPOINT {
                    return Err(E2eError::ElementNotFound(selector.to_string()));
                }
                state.mobile_search_open = true;
                Ok(())
            }
            other => {
                if let Some(id) = product_id(other, "add-to-cart-button-") {
                    if !state.broken_buttons.contains(&id) {
                        state.cart += 1;
                    }
                }
                Ok(())
            }
        }
    }

    async fn press(&self, selector: &str, key: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        if key == "Enter" && (selector == search::HEADER_SEARCH || selector == search::MOBILE_SEARCH_INPUT) {
            let term = state.fields.get(selector).cloned().unwrap_or_default();
            state.url = format!("{}/products?search={}", BASE_URL, term);
            state.search_term = Some(term);
        }
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        if selector == search::CATEGORY_FILTER {
            self.state.lock().unwrap().category = Some(value.to_string());
        }
        Ok(())
    }

    async fn scroll_into_view(&self, _selector: &str) -> E2eResult<()> {
        Ok(())
    }

    async fn set_viewport(&self, width: u32, height: u32) -> E2eResult<()> {
        self.state.lock().unwrap().viewport = (width, height);
        Ok(())
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        let state = self.state.lock().unwrap();
        let count = match selector {
            HEADER_SELECTOR | MAIN_SELECTOR => usize::from(state.landmarks),
            s if s.contains("product-card-") => Self::visible_products(&state).len(),
            _ => 0,
        };
        Ok(count)
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        let state = self.state.lock().unwrap();
        if selector == cart::CART_BADGE && state.badge_unreadable {
            return Err(E2eError::Playwright("element is not attached to the DOM".into()));
        }
        Ok(Self::visible(&state, selector))
    }

    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>> {
        let state = self.state.lock().unwrap();
        if selector == cart::CART_BADGE && state.badge_unreadable {
            return Err(E2eError::Playwright("element is not attached to the DOM".into()));
        }
        if selector == cart::CART_BADGE {
            return if state.cart > 0 {
                Ok(Some(state.cart.to_string()))
            } else {
                Err(E2eError::ElementNotFound(selector.to_string()))
            };
        }
        if selector == search::RESULTS_COUNT {
            return Ok(Some(format!(
                "Showing {} products",
                Self::visible_products(&state).len()
            )));
        }
        if let Some(id) = product_id(selector, "product-title-") {
            return Ok(state.products.iter().find(|p| p.id == id).map(|p| p.name.clone()));
        }
        if let Some(id) = product_id(selector, "product-current-price-") {
            return Ok(state
                .products
                .iter()
                .find(|p| p.id == id)
                .map(|p| format!("${}", p.price)));
        }
        Ok(None)
    }

    async fn all_text_contents(&self, selector: &str) -> E2eResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        if selector.contains("product-title-") {
            return Ok(Self::visible_products(&state).into_iter().map(|p| p.name).collect());
        }
        Ok(Vec::new())
    }

    async fn get_attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        let state = self.state.lock().unwrap();
        if selector == contact::SUBMIT_BUTTON && name == "disabled" {
            return Ok(state.submitted.then(String::new));
        }
        if selector.starts_with(cart::PRODUCT_CARD) {
            let products = Self::visible_products(&state);
            let product = nth_index(selector)
                .and_then(|i| products.get(i))
                .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))?;
            return Ok(match name {
                "data-product-id" => Some(product.id.clone()),
                "data-product-name" => Some(product.name.clone()),
                _ => None,
            });
        }
        Ok(None)
    }

    async fn validation_message(&self, selector: &str) -> E2eResult<String> {
        let state = self.state.lock().unwrap();
        let value = state.fields.get(selector).cloned().unwrap_or_default();
        let message = if value.is_empty() {
            "Please fill out this field."
        } else if selector == contact::EMAIL_FIELD && !value.contains('@') {
            "Please include an '@' in the email address."
        } else {
            ""
        };
        Ok(message.to_string())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok("Yapee - Mua sắm trực tuyến".to_string())
    }
}
