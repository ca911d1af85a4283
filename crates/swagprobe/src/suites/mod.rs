//! The Swag Labs scenario catalogue.
//!
//! | Suite        | Covers                                              |
//! |--------------|-----------------------------------------------------|
//! | `login`      | valid, rejected and locked-out logins; personas     |
//! | `inventory`  | listing, sorting, details, cart, checkout, menu     |
//! | `responsive` | login form at desktop, tablet and mobile sizes      |
//!
//! Every scenario starts from the base URL in a fresh session and builds
//! any further state (login, cart contents) through its own steps.

pub mod inventory;
pub mod login;
pub mod responsive;

use crate::assertion::{Expectation, UrlPattern};
use crate::harness::SuiteRegistry;
use crate::result::ProbeResult;
use crate::scenario::{Action, Step};
use crate::storefront::{cart_page, cart_widget, checkout_page, inventory_page};

/// Fixture key of the user most scenarios log in as
pub const STANDARD_USER: &str = "standard";

/// Registry holding every built-in suite
///
/// # Errors
///
/// Returns an error only if two built-in scenarios share a name
pub fn registry() -> ProbeResult<SuiteRegistry> {
    let mut registry = SuiteRegistry::new();
    registry.register(login::suite())?;
    registry.register(inventory::suite())?;
    registry.register(responsive::suite())?;
    Ok(registry)
}

/// URL contains `path`
pub(crate) fn at(path: &str) -> Expectation {
    Expectation::url(UrlPattern::contains(path))
}

/// Log in as the standard user and land on the inventory
pub(crate) fn logged_in() -> Vec<Step> {
    vec![Step::act(Action::login(STANDARD_USER)).expect(at(inventory_page::PATH))]
}

/// Put the first product in the cart and open the cart page
pub(crate) fn first_item_in_cart() -> Vec<Step> {
    let mut steps = logged_in();
    steps.push(Step::act(Action::Click(inventory_page::add_to_cart(0))));
    steps.push(Step::act(Action::Click(cart_widget::link())).expect(at(cart_page::PATH)));
    steps
}

/// From a one-item cart, reach the customer information form
pub(crate) fn at_checkout_step_one() -> Vec<Step> {
    let mut steps = first_item_in_cart();
    steps.push(
        Step::act(Action::Click(cart_page::checkout())).expect(at(checkout_page::STEP_ONE_PATH)),
    );
    steps
}

/// Fill the customer form and continue to the order overview
pub(crate) fn at_checkout_step_two(first: &str, last: &str) -> Vec<Step> {
    let mut steps = at_checkout_step_one();
    steps.extend([
        Step::act(Action::fill(checkout_page::first_name(), first)),
        Step::act(Action::fill(checkout_page::last_name(), last)),
        Step::act(Action::fill(checkout_page::postal_code(), "12345")),
        Step::act(Action::Click(checkout_page::continue_button()))
            .expect(at(checkout_page::STEP_TWO_PATH)),
    ]);
    steps
}
