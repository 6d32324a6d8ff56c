//! Shared test fixtures written during setup and read by the testers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use yapee_qa_common::{CapturePolicy, RunConfiguration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Values typed into the storefront contact form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormData {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFormData {
    /// A payload the storefront should accept
    pub fn valid() -> Self {
        Self {
            name: "Nguyễn Văn Test".to_string(),
            email: "test@yapee.com".to_string(),
            subject: "Kiểm tra chức năng liên hệ".to_string(),
            message: "Đây là tin nhắn test để kiểm tra form liên hệ hoạt động đúng không. \
                      Xin chào từ automation test!"
                .to_string(),
        }
    }

    /// A payload every required-field check should reject
    pub fn invalid() -> Self {
        Self {
            email: "invalid-email".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerms {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
    pub empty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub search_terms: SearchTerms,
    pub categories: Vec<String>,
    pub price_ranges: Vec<PriceRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactData {
    pub valid_form: ContactFormData,
    pub invalid_form: ContactFormData,
}

/// Contents of `test-data.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestData {
    pub users: BTreeMap<String, UserProfile>,
    pub products: ProductData,
    pub contact: ContactData,
    pub urls: BTreeMap<String, String>,
}

impl Default for TestData {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut users = BTreeMap::new();
        users.insert(
            "testUser".to_string(),
            UserProfile {
                name: "Nguyễn Văn Test".to_string(),
                email: "test@yapee.com".to_string(),
                phone: "+84123456789".to_string(),
            },
        );
        users.insert(
            "adminUser".to_string(),
            UserProfile {
                name: "Admin User".to_string(),
                email: "admin@yapee.com".to_string(),
                phone: "+84987654321".to_string(),
            },
        );

        let urls = [
            ("home", "/"),
            ("products", "/products"),
            ("contact", "/contact"),
            ("cart", "/cart"),
            ("about", "/about"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            users,
            products: ProductData {
                search_terms: SearchTerms {
                    valid: strings(&["laptop", "phone", "headphone", "camera", "tablet"]),
                    invalid: strings(&["xyz123", "!@#$%", "nonexistent"]),
                    empty: String::new(),
                },
                categories: strings(&["Electronics", "Clothing", "Books", "Home", "Sports"]),
                price_ranges: vec![
                    PriceRange { min: 0, max: 100 },
                    PriceRange { min: 100, max: 500 },
                    PriceRange { min: 500, max: 1000 },
                    PriceRange { min: 1000, max: 5000 },
                ],
            },
            contact: ContactData {
                valid_form: ContactFormData::valid(),
                invalid_form: ContactFormData::invalid(),
            },
            urls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub short: u64,
    pub medium: u64,
    pub long: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryCounts {
    pub flaky: u32,
    pub stable: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSettings {
    pub on_failure: bool,
    pub on_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_page: Option<bool>,
}

impl CaptureSettings {
    fn from_policy(policy: CapturePolicy, full_page: Option<bool>) -> Self {
        Self {
            on_failure: policy.on_failure(),
            on_success: policy.on_success(),
            full_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceThresholds {
    pub max_load_time: u64,
    pub max_interaction_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityChecks {
    pub check_contrast: bool,
    pub check_keyboard: bool,
    pub check_screen_reader: bool,
}

/// Contents of `test-config.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeTunables {
    pub timeouts: Timeouts,
    pub retries: RetryCounts,
    pub screenshots: CaptureSettings,
    pub videos: CaptureSettings,
    pub performance: PerformanceThresholds,
    pub accessibility: AccessibilityChecks,
}

impl RuntimeTunables {
    pub fn for_config(config: &RunConfiguration) -> Self {
        Self {
            timeouts: Timeouts {
                short: 5_000,
                medium: 10_000,
                long: 30_000,
            },
            retries: RetryCounts { flaky: 3, stable: 1 },
            screenshots: CaptureSettings::from_policy(config.screenshot, Some(true)),
            videos: CaptureSettings::from_policy(config.video, None),
            performance: PerformanceThresholds {
                max_load_time: 5_000,
                max_interaction_time: 2_000,
            },
            accessibility: AccessibilityChecks {
                check_contrast: true,
                check_keyboard: true,
                check_screen_reader: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRun {
    pub id: String,
    pub timestamp: String,
    pub environment: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub browser: String,
    pub platform: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub duration: u64,
}

/// Contents of `test-results/report-template.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub test_run: TemplateRun,
    pub summary: TemplateSummary,
    pub tests: Vec<serde_json::Value>,
    pub errors: Vec<serde_json::Value>,
    pub performance: serde_json::Map<String, serde_json::Value>,
    pub screenshots: Vec<String>,
    pub videos: Vec<String>,
}

impl ReportTemplate {
    pub fn new(config: &RunConfiguration) -> Self {
        let now = chrono::Utc::now();
        Self {
            test_run: TemplateRun {
                id: format!("test-run-{}", now.timestamp_millis()),
                timestamp: now.to_rfc3339(),
                environment: config.mode.to_string(),
                base_url: config.base_url.clone(),
                browser: "multiple".to_string(),
                platform: std::env::consts::OS.to_string(),
            },
            summary: TemplateSummary::default(),
            tests: Vec::new(),
            errors: Vec::new(),
            performance: serde_json::Map::new(),
            screenshots: Vec::new(),
            videos: Vec::new(),
        }
    }
}

/// Body of `README-test-artifacts.md`
pub fn artifacts_readme(generated_at: &str) -> String {
    format!(
        r#"# Yapee Test Automation Artifacts

This directory contains test artifacts generated during automated testing.

## Directory Structure

- **screenshots/**: Screenshots taken during test execution
- **videos/**: Video recordings of test runs
- **test-results/**: Test results, reports, and metadata
- **test-results/runs/**: Archived artifacts of previous runs (newest 10 kept)
- **playwright-report/**: HTML test reports
- **traces/**: Playwright traces for debugging
- **downloads/**: Files downloaded during tests

## Files

- **test-data.json**: Test data used across all tests
- **test-config.json**: Test configuration settings
- **test-results/environment.json**: Environment information
- **test-results/report-template.json**: Template for test reports
- **test-results/run-report.json**: Suite results of the last run
- **test-results/test-summary.json**, **test-summary.md**: Summary of the last run

## Usage

```bash
# Interactive suite menu
yapee-test

# Run one suite
yapee-test contact
yapee-test all

# Headed browser / debug mode
HEADLESS=false yapee-test playwright
DEBUG=1 yapee-test playwright

# Prepare or summarize without running
yapee-test setup
yapee-test teardown
```

## Generated: {generated_at}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uses_camel_case_keys() {
        let json = serde_json::to_value(TestData::default()).unwrap();
        assert_eq!(json["products"]["searchTerms"]["valid"][0], "laptop");
        assert_eq!(json["products"]["priceRanges"].as_array().unwrap().len(), 4);
        assert_eq!(json["contact"]["invalidForm"]["email"], "invalid-email");
        assert_eq!(json["users"]["testUser"]["phone"], "+84123456789");
        assert_eq!(json["urls"]["contact"], "/contact");
    }

    #[test]
    fn test_tunables_follow_capture_policy() {
        let tunables = RuntimeTunables::for_config(&RunConfiguration::default());
        assert!(tunables.screenshots.on_failure);
        assert!(!tunables.screenshots.on_success);
        assert_eq!(tunables.screenshots.full_page, Some(true));
        assert_eq!(tunables.timeouts.medium, 10_000);
        assert_eq!(tunables.performance.max_interaction_time, 2_000);

        let json = serde_json::to_value(tunables).unwrap();
        assert!(json["videos"].get("fullPage").is_none());
        assert_eq!(json["accessibility"]["checkScreenReader"], true);
    }

    #[test]
    fn test_report_template_is_empty() {
        let template = ReportTemplate::new(&RunConfiguration::default());
        assert!(template.test_run.id.starts_with("test-run-"));
        assert_eq!(template.summary, TemplateSummary::default());

        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["testRun"]["baseURL"], "http://localhost:5175");
    }
}
