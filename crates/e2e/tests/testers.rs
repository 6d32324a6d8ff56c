//! Page tester workflows against a scripted storefront

mod support;

use support::{FakeStorefront, Product, BASE_URL};
use std::time::Duration;

use yapee_qa_e2e::fixtures::ContactFormData;
use yapee_qa_e2e::page::{Page, WaitState};
use yapee_qa_e2e::setup::check_page_structure;
use yapee_qa_e2e::testers::{contact, AddToCartTester, ContactFormTester, SearchTester, TesterTimings};
use yapee_qa_e2e::E2eError;

fn timings() -> TesterTimings {
    TesterTimings::instant()
}

// Contact form

#[tokio::test]
async fn contact_form_complete_flow() {
    let page = FakeStorefront::new();
    let tester = ContactFormTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();

    let validation = tester.test_form_validation().await.unwrap();
    assert!(validation.has_validation());
    assert_eq!(validation.name_validation, "Please fill out this field.");

    tester.fill_form(&ContactFormData::valid()).await.unwrap();
    tester.submit_form().await.unwrap();

    let check = tester.verify_submission().await.unwrap();
    assert!(check.message_visible);
    assert!(check.submit_disabled);
}

#[tokio::test]
async fn contact_form_detects_dropped_input() {
    let page = FakeStorefront::new().dropping_input(contact::SUBJECT_FIELD);
    let tester = ContactFormTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();
    let err = tester.fill_form(&ContactFormData::valid()).await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed(ref msg) if msg.contains("contact-subject-input")));
}

#[tokio::test]
async fn contact_submit_retries_until_success() {
    let page = FakeStorefront::new().failing_submits(2);
    let tester = ContactFormTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();
    tester.fill_form(&ContactFormData::valid()).await.unwrap();
    tester.submit_form().await.unwrap();

    let submits = page.clicks().iter().filter(|c| *c == contact::SUBMIT_BUTTON).count();
    assert_eq!(submits, 3);
}

#[tokio::test]
async fn contact_submit_fails_when_nothing_appears() {
    let page = FakeStorefront::new();
    let tester = ContactFormTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();
    let err = tester.submit_form().await.unwrap_err();
    assert!(matches!(err, E2eError::Timeout(_)));
    assert_eq!(page.clicks().len(), 3);
}

#[tokio::test]
async fn either_wait_reports_which_selector_appeared() {
    let page = FakeStorefront::new();
    page.goto(&format!("{}/contact", BASE_URL), Duration::from_secs(1)).await.unwrap();
    let short = Duration::from_millis(20);

    let seen = page
        .wait_for_either((contact::SUCCESS_MESSAGE, short), (contact::FORM, short), WaitState::Visible)
        .await
        .unwrap();
    assert_eq!(seen, 1);

    let seen = page
        .wait_for_either((contact::FORM, short), (contact::LOADING_TEXT, short), WaitState::Visible)
        .await
        .unwrap();
    assert_eq!(seen, 0);

    let err = page
        .wait_for_either((contact::SUCCESS_MESSAGE, short), (contact::LOADING_TEXT, short), WaitState::Visible)
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::Timeout(_)));
}

// Add to cart

#[tokio::test]
async fn cart_addition_is_observed_on_badge() {
    let page = FakeStorefront::new();
    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();
    let product = tester.get_product_info(1).await.unwrap();
    assert_eq!(product.id, "102");
    assert_eq!(product.name, "Gaming Laptop");
    assert_eq!(product.price.as_deref(), Some("$450"));

    let addition = tester.add_product_to_cart(0).await.unwrap();
    assert_eq!(addition.initial_count, 0);
    assert_eq!(addition.new_count, 1);
    assert_eq!(tester.verify_cart_count(1).await.unwrap(), 1);
}

#[tokio::test]
async fn cart_adds_three_products_in_sequence() {
    let page = FakeStorefront::new();
    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();
    let attempts = tester.test_multiple_products(3).await;

    assert_eq!(attempts.len(), 3);
    assert!(attempts.iter().all(|a| a.success));
    assert_eq!(attempts[2].addition.as_ref().unwrap().new_count, 3);
    assert_eq!(tester.get_cart_count().await, 3);
}

#[tokio::test]
async fn cart_batch_records_failures_and_continues() {
    let page = FakeStorefront::new().broken_add_button("102");
    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());

    tester.navigate().await.unwrap();
    let attempts = tester.test_multiple_products(3).await;

    let outcomes: Vec<bool> = attempts.iter().map(|a| a.success).collect();
    assert_eq!(outcomes, vec![true, false, true]);
    assert!(attempts[1].error.as_deref().unwrap().contains("cart badge count"));
    assert_eq!(page.cart_count(), 2);
}

#[tokio::test]
async fn empty_listing_is_a_hard_failure() {
    let page = FakeStorefront::new().with_products(Vec::new());
    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());

    assert!(matches!(
        tester.get_product_info(0).await,
        Err(E2eError::NoProductsFound)
    ));
    assert!(matches!(
        tester.add_product_to_cart(0).await,
        Err(E2eError::NoProductsFound)
    ));
    assert!(page.clicks().is_empty());
}

#[tokio::test]
async fn product_index_out_of_range() {
    let page = FakeStorefront::new().with_products(vec![Product::new("1", "Phone", "Electronics", 300)]);
    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());

    assert!(matches!(
        tester.get_product_info(1).await,
        Err(E2eError::ElementNotFound(_))
    ));
}

#[tokio::test]
async fn absent_badge_counts_as_zero() {
    let page = FakeStorefront::new();
    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());

    assert_eq!(tester.get_cart_count().await, 0);
    assert_eq!(tester.verify_cart_count(0).await.unwrap(), 0);
    assert!(matches!(
        tester.verify_cart_count(2).await,
        Err(E2eError::AssertionFailed(_))
    ));
}

#[tokio::test]
async fn unreadable_badge_counts_as_zero() {
    let page = FakeStorefront::new().unreadable_badge();
    page.click(r#"[data-testid="add-to-cart-button-101"]"#).await.unwrap();
    assert_eq!(page.cart_count(), 1);

    let tester = AddToCartTester::with_timings(&page, BASE_URL, timings());
    assert_eq!(tester.get_cart_count().await, 0);
}

// Search

#[tokio::test]
async fn header_search_reports_relevance() {
    let page = FakeStorefront::new();
    let tester = SearchTester::with_timings(&page, BASE_URL, timings());

    let outcome = tester.test_header_search("laptop").await.unwrap();
    assert!(page.url().starts_with("http://storefront.test/products"));
    assert_eq!(outcome.result_count, 2);
    assert_eq!(outcome.relevant_count, 2);
    assert_eq!(outcome.relevance_ratio, 1.0);
    assert!(outcome.is_conclusive());
}

#[tokio::test]
async fn unmatched_search_shows_no_results_indicator() {
    let page = FakeStorefront::new();
    let tester = SearchTester::with_timings(&page, BASE_URL, timings());

    let outcome = tester.test_products_page_search("zzznomatch").await.unwrap();
    assert_eq!(outcome.result_count, 0);
    assert!(!outcome.has_results);
    assert!(outcome.has_no_results_message);
    assert_eq!(outcome.relevance_ratio, 0.0);
    assert!(outcome.is_conclusive());
}

#[tokio::test]
async fn mobile_search_uses_small_viewport() {
    let page = FakeStorefront::new();
    let tester = SearchTester::with_timings(&page, BASE_URL, timings());

    let outcome = tester.test_mobile_search("mouse").await.unwrap();
    assert_eq!(page.viewport(), (375, 667));
    assert_eq!(outcome.product_titles, vec!["Wireless Mouse".to_string()]);
}

#[tokio::test]
async fn filters_apply_in_sequence() {
    let page = FakeStorefront::new();
    let tester = SearchTester::with_timings(&page, BASE_URL, timings());

    let outcome = tester.test_search_filters().await.unwrap();
    assert_eq!(outcome.category_filter.count, 3);
    assert_eq!(outcome.category_filter.display_text.as_deref(), Some("Showing 3 products"));
    assert_eq!(outcome.price_filter.count, 2);
}

// Setup readiness check

#[tokio::test]
async fn structure_check_sees_landmarks() {
    let page = FakeStorefront::new();
    let check = check_page_structure(&page, BASE_URL).await.unwrap();
    assert!(check.is_complete());
    assert_eq!(check.title, "Yapee - Mua sắm trực tuyến");

    let bare = FakeStorefront::new().without_landmarks();
    let check = check_page_structure(&bare, BASE_URL).await.unwrap();
    assert!(!check.has_header);
    assert!(!check.has_main);
}
