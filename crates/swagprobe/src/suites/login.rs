//! Login scenarios.

use super::{at, STANDARD_USER};
use crate::assertion::{Expectation, UrlPattern};
use crate::harness::TestSuite;
use crate::scenario::{Action, Scenario, Step};
use crate::storefront::{inventory_page, login_page};
use std::time::Duration;

/// Personas that log in successfully, and how long their login may take
const PERSONAS: [(&str, Duration); 4] = [
    ("problem", Duration::from_secs(5)),
    ("performance_glitch", Duration::from_secs(15)),
    ("error", Duration::from_secs(5)),
    ("visual", Duration::from_secs(5)),
];

/// Build the `login` suite
#[must_use]
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("login").with_description("Login form outcomes per persona");

    suite.add(
        Scenario::new("valid credentials")
            .with_tag("login")
            .with_tag("smoke")
            .then(Action::login(STANDARD_USER))
            .expect(at(inventory_page::PATH))
            .expect(Expectation::visible(inventory_page::app_logo())),
    );

    suite.add(rejected(
        "incorrect credentials",
        Action::login_with_password("invalid", "incorrectpassword"),
        login_page::BAD_CREDENTIALS,
    ));

    suite.add(rejected(
        "locked out user",
        Action::login("locked"),
        login_page::LOCKED_OUT,
    ));

    for (key, budget) in PERSONAS {
        suite.add(
            Scenario::new(format!("persona {key} reaches inventory"))
                .with_tag("login")
                .then(Action::login(key))
                .expect(at(inventory_page::PATH).with_timeout(budget)),
        );
    }

    suite
}

/// Login attempt that must leave the user on the form with `message`
fn rejected(name: &str, action: Action, message: &str) -> Scenario {
    Scenario::new(name).with_tag("login").step(
        Step::act(action)
            .expect(Expectation::visible(login_page::error_container()))
            .expect(Expectation::visible(login_page::error_button()))
            .expect(Expectation::visible(login_page::message(message)))
            .expect(Expectation::visible(login_page::submit()))
            .expect(Expectation::url(still_on_form())),
    )
}

/// The login form is served at the site root; every page behind it is an `.html` document
fn still_on_form() -> UrlPattern {
    UrlPattern::excludes(".html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::Condition;
    use crate::locator::Locator;

    #[test]
    fn test_rejections_check_banner_text() {
        let suite = suite();
        let locked = suite
            .scenarios
            .iter()
            .find(|s| s.name == "locked out user")
            .unwrap();
        let expectations = &locked.steps[0].expectations;
        assert!(expectations.iter().any(|e| e
            == &Expectation::element(Locator::text(login_page::LOCKED_OUT), Condition::Visible)));
    }

    #[test]
    fn test_rejections_check_url_stays_on_form() {
        let suite = suite();
        for name in ["incorrect credentials", "locked out user"] {
            let scenario = suite.scenarios.iter().find(|s| s.name == name).unwrap();
            let expectations = &scenario.steps[0].expectations;
            assert!(
                expectations
                    .iter()
                    .any(|e| e == &Expectation::url(UrlPattern::excludes(".html"))),
                "{name} does not check the URL"
            );
        }
    }

    #[test]
    fn test_form_url_check() {
        let pattern = still_on_form();
        assert!(pattern.matches("https://www.saucedemo.com/"));
        assert!(!pattern.matches("https://www.saucedemo.com/inventory.html"));
    }

    #[test]
    fn test_invalid_login_overrides_password() {
        let suite = suite();
        let invalid = &suite.scenarios[1];
        assert_eq!(
            invalid.steps[0].action,
            Some(Action::login_with_password("invalid", "incorrectpassword"))
        );
    }

    #[test]
    fn test_slow_persona_gets_longer_budget() {
        let suite = suite();
        let glitch = suite
            .scenarios
            .iter()
            .find(|s| s.name.contains("performance_glitch"))
            .unwrap();
        assert_eq!(
            glitch.steps[0].expectations[0].timeout,
            Some(Duration::from_secs(15))
        );
    }
}
