//! Layout checks of the login form across viewports.

use crate::assertion::Expectation;
use crate::emulation::Viewport;
use crate::harness::TestSuite;
use crate::scenario::{Action, Scenario, Step};
use crate::storefront::login_page;

/// Build the `responsive` suite
#[must_use]
pub fn suite() -> TestSuite {
    let mut suite =
        TestSuite::new("responsive").with_description("Login form renders at common screen sizes");
    suite.add(layout("desktop layout", Viewport::DESKTOP).with_tag("smoke"));
    suite.add(layout("tablet layout", Viewport::TABLET));
    suite.add(layout("mobile layout", Viewport::MOBILE));
    suite
}

fn layout(name: &str, viewport: Viewport) -> Scenario {
    Scenario::new(name).with_tag("responsive").step(
        Step::act(Action::SetViewport(viewport))
            .expect(Expectation::visible(login_page::logo()))
            .expect(Expectation::visible(login_page::username()))
            .expect(Expectation::visible(login_page::password()))
            .expect(Expectation::visible(login_page::submit())),
    )
}
