//! Login helper.

use crate::assertion::expect;
use crate::result::ProbeResult;
use crate::session::PageSession;
use crate::storefront::login_page;

/// Fill the login form and submit it.
///
/// The outcome is not checked here: a rejected login leaves the page on the
/// form with an error banner, and it is up to the caller to assert which of
/// the two happened. Only driver failures surface as errors.
///
/// # Errors
///
/// Returns `ActionTimeout` if a form control never becomes actionable
pub async fn login(session: &PageSession, username: &str, password: &str) -> ProbeResult<()> {
    tracing::debug!(username, "submitting login form");
    session.fill(&login_page::username(), username).await?;
    session.fill(&login_page::password(), password).await?;
    session.click(&login_page::submit()).await
}

/// Assert the login page is rendered (logo and body visible)
///
/// # Errors
///
/// Returns `AssertionTimeout` if either element stays hidden
pub async fn login_page_visible(session: &PageSession) -> ProbeResult<()> {
    let _ = expect(session, login_page::logo()).to_be_visible().await?;
    let _ = expect(session, login_page::body()).to_be_visible().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::result::ProbeError;
    use crate::session::DEFAULT_BASE_URL;
    use crate::wait::PollConfig;
    use std::time::Duration;

    fn session_for(driver: &MockDriver) -> PageSession {
        PageSession::new(
            Box::new(driver.clone()),
            DEFAULT_BASE_URL,
            PollConfig::new(Duration::from_millis(100)).with_interval(Duration::from_millis(10)),
        )
    }

    fn login_form(driver: &MockDriver) {
        let mut dom = driver.dom();
        dom.set_element(&login_page::logo(), MockElement::visible("Swag Labs"));
        dom.set_element(&login_page::body(), MockElement::visible(""));
        dom.set_element(&login_page::username(), MockElement::visible(""));
        dom.set_element(&login_page::password(), MockElement::visible(""));
        dom.set_element(&login_page::submit(), MockElement::visible("Login"));
    }

    #[tokio::test]
    async fn test_login_fills_then_clicks() {
        let driver = MockDriver::new();
        login_form(&driver);
        let session = session_for(&driver);

        login(&session, "standard_user", "secret_sauce").await.unwrap();

        let dom = driver.dom();
        assert_eq!(
            dom.history(),
            [
                "fill:css=#user-name=standard_user",
                "fill:css=#password=secret_sauce",
                "click:css=#login-button",
            ]
        );
    }

    #[tokio::test]
    async fn test_login_does_not_check_outcome() {
        let driver = MockDriver::new();
        login_form(&driver);
        let session = session_for(&driver);
        // Nothing reacts to the click; the page never leaves the form
        login(&session, "invalid_user", "incorrectpassword")
            .await
            .unwrap();
        assert_eq!(session.url().await.unwrap(), "about:blank");
    }

    #[tokio::test]
    async fn test_login_without_form_times_out() {
        let driver = MockDriver::new();
        let session = session_for(&driver);
        let err = login(&session, "standard_user", "secret_sauce")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::ActionTimeout { .. }));
    }

    #[tokio::test]
    async fn test_login_page_visible() {
        let driver = MockDriver::new();
        login_form(&driver);
        let session = session_for(&driver);
        login_page_visible(&session).await.unwrap();

        driver.dom().remove(&login_page::logo());
        let err = login_page_visible(&session).await.unwrap_err();
        assert!(matches!(err, ProbeError::AssertionTimeout { .. }));
    }
}
