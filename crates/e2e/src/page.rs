//! Browser page capability surface
//!
//! Everything the setup readiness check and the page testers do to a live
//! page goes through [`Page`]. [`crate::playwright::PlaywrightSession`] is the
//! production implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Page load milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Load,
    DomContentLoaded,
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Load => "load",
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

/// Element states a selector wait can target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

/// Select the `index`-th (0-based) match of `selector`
pub fn nth(selector: &str, index: usize) -> String {
    format!("{} >> nth={}", selector, index)
}

/// A live browser page.
///
/// Selectors use Playwright syntax. Single-element reads (`text_content`,
/// `get_attribute`, `is_visible`, ...) act on the first match.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str, timeout: Duration) -> E2eResult<()>;

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()>;

    async fn wait_for_selector(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()>;

    /// Wait for either of two selectors to reach `state`, each under its own bound.
    ///
    /// Returns 0 or 1 for whichever was observed first and fails only when
    /// both waits fail. Implementations that serialize requests should
    /// override this with a single concurrent wait.
    async fn wait_for_either(
        &self,
        first: (&str, Duration),
        second: (&str, Duration),
        state: WaitState,
    ) -> E2eResult<usize> {
        let a = self.wait_for_selector(first.0, state, first.1);
        let b = self.wait_for_selector(second.0, state, second.1);
        tokio::pin!(a, b);

        tokio::select! {
            res = &mut a => match res {
                Ok(()) => Ok(0),
                Err(_) => b.await.map(|_| 1),
            },
            res = &mut b => match res {
                Ok(()) => Ok(1),
                Err(_) => a.await.map(|_| 0),
            },
        }
    }

    /// Wait until the page URL matches a glob such as `**/products**`
    async fn wait_for_url(&self, pattern: &str, timeout: Duration) -> E2eResult<()>;

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;

    async fn input_value(&self, selector: &str) -> E2eResult<String>;

    async fn click(&self, selector: &str) -> E2eResult<()>;

    async fn press(&self, selector: &str, key: &str) -> E2eResult<()>;

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()>;

    async fn scroll_into_view(&self, selector: &str) -> E2eResult<()>;

    async fn set_viewport(&self, width: u32, height: u32) -> E2eResult<()>;

    async fn count(&self, selector: &str) -> E2eResult<usize>;

    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;

    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>>;

    async fn all_text_contents(&self, selector: &str) -> E2eResult<Vec<String>>;

    async fn get_attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>>;

    /// The element's native constraint-validation message (empty when valid)
    async fn validation_message(&self, selector: &str) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_selector() {
        assert_eq!(
            nth("[data-testid^=\"product-card-\"]", 2),
            "[data-testid^=\"product-card-\"] >> nth=2"
        );
    }
}
