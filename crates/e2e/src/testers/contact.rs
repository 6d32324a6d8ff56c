//! Contact form workflow

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::ContactFormData;
use crate::page::{Page, WaitState};
use crate::retry::with_retry;

use super::{navigate_and_wait, page_url, scroll_to, TesterTimings};

pub const CONTAINER: &str = r#"[data-testid="contact-form-container"]"#;
pub const FORM: &str = r#"[data-testid="contact-form"]"#;
pub const NAME_FIELD: &str = r#"[data-testid="contact-name-input"]"#;
pub const EMAIL_FIELD: &str = r#"[data-testid="contact-email-input"]"#;
pub const SUBJECT_FIELD: &str = r#"[data-testid="contact-subject-input"]"#;
pub const MESSAGE_FIELD: &str = r#"[data-testid="contact-message-textarea"]"#;
pub const SUBMIT_BUTTON: &str = r#"[data-testid="contact-submit-button"]"#;
pub const SUCCESS_MESSAGE: &str = r#"[data-testid="contact-form-success-message"]"#;
pub const LOADING_TEXT: &str = r#"[data-testid="contact-submit-loading-text"]"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCheck {
    pub message_visible: bool,
    /// Submit control disabled after sending
    pub submit_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCheck {
    pub name_validation: String,
    pub email_validation: String,
}

impl ValidationCheck {
    pub fn has_validation(&self) -> bool {
        !self.name_validation.is_empty() || !self.email_validation.is_empty()
    }
}

pub struct ContactFormTester<'a> {
    page: &'a dyn Page,
    base_url: String,
    timings: TesterTimings,
}

impl<'a> ContactFormTester<'a> {
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
            &page_url(&self.base_url, "/contact"),
            Some(CONTAINER),
            &self.timings,
        )
        .await
    }

    /// Fill each field and read it back before moving on
    pub async fn fill_form(&self, data: &ContactFormData) -> E2eResult<()> {
        scroll_to(self.page, FORM, &self.timings).await?;

        let fields = [
            (NAME_FIELD, data.name.as_str()),
            (EMAIL_FIELD, data.email.as_str()),
            (SUBJECT_FIELD, data.subject.as_str()),
            (MESSAGE_FIELD, data.message.as_str()),
        ];
        for (selector, value) in fields {
            self.page.fill(selector, value).await?;
            let actual = self.page.input_value(selector).await?;
            if actual != value {
                return Err(E2eError::AssertionFailed(format!(
                    "{} holds {:?}, expected {:?}",
                    selector, actual, value
                )));
            }
        }
        debug!("Contact form filled");
        Ok(())
    }

    /// Click submit and wait for the success message or the loading indicator
    pub async fn submit_form(&self) -> E2eResult<()> {
        with_retry(&self.timings.retry, |attempt| async move {
            debug!("Submitting contact form (attempt {})", attempt);
            self.page.click(SUBMIT_BUTTON).await?;
            self.await_submission_signal().await
        })
        .await
    }

    async fn await_submission_signal(&self) -> E2eResult<()> {
        // Whichever signal shows up first settles it; only both failing is a failure.
        let seen = self
            .page
            .wait_for_either(
                (SUCCESS_MESSAGE, self.timings.success),
                (LOADING_TEXT, self.timings.loading),
                WaitState::Visible,
            )
            .await?;
        debug!(
            "Submission acknowledged by {}",
            if seen == 0 { "success message" } else { "loading indicator" }
        );
        Ok(())
    }

    pub async fn verify_submission(&self) -> E2eResult<SubmissionCheck> {
        self.page
            .wait_for_selector(SUCCESS_MESSAGE, WaitState::Visible, self.timings.element)
            .await?;

        let message_visible = self.page.is_visible(SUCCESS_MESSAGE).await?;
        if !message_visible {
            return Err(E2eError::AssertionFailed(
                "contact success message is not visible".into(),
            ));
        }

        let submit_disabled = self
            .page
            .get_attribute(SUBMIT_BUTTON, "disabled")
            .await?
            .is_some();

        info!("Contact form submitted (submit disabled: {})", submit_disabled);
        Ok(SubmissionCheck {
            message_visible,
            submit_disabled,
        })
    }

    /// Submit the empty form and read the validation feedback of name and email
    pub async fn test_form_validation(&self) -> E2eResult<ValidationCheck> {
        self.page.click(SUBMIT_BUTTON).await?;
        Ok(ValidationCheck {
            name_validation: self.page.validation_message(NAME_FIELD).await?,
            email_validation: self.page.validation_message(EMAIL_FIELD).await?,
        })
    }
}
