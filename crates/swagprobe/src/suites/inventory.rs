//! Inventory, cart, checkout and menu scenarios.
//!
//! All of these start by logging in as the standard user.

use super::{at, at_checkout_step_one, at_checkout_step_two, first_item_in_cart, logged_in};
use crate::assertion::{Condition, Expectation};
use crate::harness::TestSuite;
use crate::scenario::{Action, Scenario, Step};
use crate::storefront::{
    cart_page, cart_widget, checkout_page, inventory_page, item_page, menu, CATALOGUE_SIZE,
};

/// Sort option value, what the check reads, and the expected first entry
const SORTS: [(&str, &str, &str); 4] = [
    ("az", "name", "Sauce Labs Backpack"),
    ("za", "name", "Test.allTheThings() T-Shirt (Red)"),
    ("lohi", "price", "$7.99"),
    ("hilo", "price", "$49.99"),
];

/// Build the `inventory` suite
#[must_use]
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("inventory")
        .with_description("Product listing, cart, checkout and navigation menu");

    for scenario in listing()
        .into_iter()
        .chain(sorting())
        .chain(details())
        .chain(cart())
        .chain(checkout())
        .chain(navigation_menu())
    {
        suite.add(scenario);
    }
    suite
}

fn listing() -> Vec<Scenario> {
    let card_checks = (0..CATALOGUE_SIZE).flat_map(|i| {
        let i = i32::try_from(i).unwrap_or(i32::MAX);
        [
            Expectation::visible(inventory_page::item_image(i)),
            Expectation::visible(inventory_page::item_name(i)),
            Expectation::visible(inventory_page::item_description(i)),
            Expectation::visible(inventory_page::item_price(i)),
        ]
    });

    vec![Scenario::new("products list")
        .with_tag("inventory")
        .with_tag("smoke")
        .steps(logged_in())
        .expect(Expectation::visible(inventory_page::app_logo()))
        .step(
            Step::check(card_checks)
                .expect(Expectation::count(inventory_page::items(), CATALOGUE_SIZE)),
        )]
}

fn sorting() -> Vec<Scenario> {
    SORTS
        .iter()
        .map(|&(value, field, first)| {
            let target = if field == "name" {
                inventory_page::first_name()
            } else {
                inventory_page::first_price()
            };
            Scenario::new(format!("sort by {field} ({value})"))
                .with_tag("inventory")
                .steps(logged_in())
                .then(Action::select(inventory_page::sort(), value))
                .expect(Expectation::text(target, first))
        })
        .collect()
}

fn details() -> Vec<Scenario> {
    let open_first = || {
        let mut steps = logged_in();
        steps.push(
            Step::act(Action::Click(inventory_page::first_name())).expect(at(item_page::PATH)),
        );
        steps
    };

    vec![
        Scenario::new("product details")
            .with_tag("inventory")
            .steps(open_first())
            .expect(Expectation::visible(item_page::image()))
            .expect(Expectation::visible(item_page::name()))
            .expect(Expectation::visible(item_page::description()))
            .expect(Expectation::visible(item_page::price())),
        Scenario::new("add and remove on details page")
            .with_tag("inventory")
            .with_tag("cart")
            .steps(open_first())
            .then(Action::Click(item_page::add_to_cart()))
            .expect(Expectation::visible(item_page::remove()))
            .then(Action::Click(item_page::remove()))
            .expect(Expectation::visible(item_page::add_to_cart())),
        Scenario::new("back to products")
            .with_tag("inventory")
            .steps(open_first())
            .then(Action::Click(item_page::back()))
            .expect(at(inventory_page::PATH)),
    ]
}

fn cart() -> Vec<Scenario> {
    vec![
        Scenario::new("add to cart updates badge")
            .with_tag("cart")
            .with_tag("smoke")
            .steps(logged_in())
            .then(Action::Click(inventory_page::add_to_cart(0)))
            .expect(Expectation::text(cart_widget::badge(), "1"))
            .then(Action::Click(inventory_page::add_to_cart(1)))
            .expect(Expectation::text(cart_widget::badge(), "2")),
        Scenario::new("removing every item clears the cart")
            .with_tag("cart")
            .steps(logged_in())
            .then(Action::Click(inventory_page::add_to_cart(0)))
            .then(Action::Click(inventory_page::add_to_cart(1)))
            .expect(Expectation::text(cart_widget::badge(), "2"))
            .then(Action::Click(inventory_page::remove(0)))
            .expect(Expectation::text(cart_widget::badge(), "1"))
            .then(Action::Click(inventory_page::remove(1)))
            .expect(Expectation::hidden(cart_widget::badge()))
            .then(Action::Click(cart_widget::link()))
            .expect(at(cart_page::PATH))
            .expect(Expectation::count(cart_page::items(), 0)),
        Scenario::new("cart lists added product")
            .with_tag("cart")
            .steps(first_item_in_cart())
            .expect(Expectation::visible(cart_page::item(0))),
        Scenario::new("remove product from cart")
            .with_tag("cart")
            .steps(first_item_in_cart())
            .expect(Expectation::visible(cart_page::item(0)))
            .then(Action::Click(cart_page::remove(0)))
            .expect(Expectation::count(cart_page::items(), 0)),
        Scenario::new("remove one of two cart items")
            .with_tag("cart")
            .steps(logged_in())
            .then(Action::Click(inventory_page::add_to_cart(0)))
            .then(Action::Click(inventory_page::add_to_cart(1)))
            .expect(Expectation::text(cart_widget::badge(), "2"))
            .then(Action::Click(cart_widget::link()))
            .expect(at(cart_page::PATH))
            .expect(Expectation::count(cart_page::items(), 2))
            .then(Action::Click(cart_page::remove(0)))
            .expect(Expectation::count(cart_page::items(), 1))
            .expect(Expectation::text(cart_widget::badge(), "1")),
    ]
}

fn checkout() -> Vec<Scenario> {
    vec![
        Scenario::new("checkout button opens customer form")
            .with_tag("checkout")
            .steps(at_checkout_step_one()),
        Scenario::new("customer information continues to overview")
            .with_tag("checkout")
            .steps(at_checkout_step_two("Spider", "Man")),
        Scenario::new("empty postal code is rejected")
            .with_tag("checkout")
            .steps(at_checkout_step_one())
            .then(Action::fill(checkout_page::first_name(), "Bat"))
            .then(Action::fill(checkout_page::last_name(), "man"))
            .then(Action::Click(checkout_page::continue_button()))
            .expect(Expectation::visible(checkout_page::error()))
            .expect(Expectation::contains_text(checkout_page::error(), "Postal Code"))
            .expect(at(checkout_page::STEP_ONE_PATH)),
        Scenario::new("order overview shows prices")
            .with_tag("checkout")
            .steps(at_checkout_step_two("Super", "man"))
            .step(Step::check([
                Expectation::visible(cart_page::items().first()),
                Expectation::visible(checkout_page::subtotal()),
                Expectation::contains_text(checkout_page::subtotal(), "$"),
                Expectation::visible(checkout_page::tax()),
                Expectation::contains_text(checkout_page::tax(), "$"),
                Expectation::visible(checkout_page::total()),
                Expectation::contains_text(checkout_page::total(), "$"),
            ])),
        Scenario::new("order total equals subtotal plus tax")
            .with_tag("totals")
            .steps(at_checkout_step_two("Super", "man"))
            .step(Step::check([Expectation::element(
                checkout_page::total(),
                Condition::AmountEqualsSumOf(vec![checkout_page::subtotal(), checkout_page::tax()]),
            )])),
        Scenario::new("cancel returns to inventory")
            .with_tag("checkout")
            .steps(at_checkout_step_two("Son", "Goku"))
            .then(Action::Click(checkout_page::cancel()))
            .expect(at(inventory_page::PATH)),
        Scenario::new("finish completes the order")
            .with_tag("checkout")
            .with_tag("smoke")
            .steps(at_checkout_step_two("Go", "han"))
            .then(Action::Click(checkout_page::finish()))
            .expect(at(checkout_page::COMPLETE_PATH))
            .expect(Expectation::text(
                checkout_page::complete_header(),
                checkout_page::THANK_YOU,
            ))
            .expect(Expectation::visible(checkout_page::back_home())),
    ]
}

fn navigation_menu() -> Vec<Scenario> {
    let open_menu = || {
        let mut steps = logged_in();
        steps.push(Step::act(Action::Click(menu::open_button())));
        steps
    };

    vec![
        Scenario::new("menu lists every entry")
            .with_tag("menu")
            .steps(open_menu())
            .expect(Expectation::visible(menu::item_list()))
            .step(Step::check(
                menu::ENTRIES
                    .iter()
                    .map(|label| Expectation::visible(menu::entry(label))),
            )),
        Scenario::new("all items returns to inventory")
            .with_tag("menu")
            .steps(open_menu())
            .then(Action::Click(menu::entry("All Items")))
            .expect(at(inventory_page::PATH))
            .expect(Expectation::visible(inventory_page::list())),
        Scenario::new("about links to saucelabs")
            .with_tag("menu")
            .steps(open_menu())
            .expect(Expectation::attribute(
                menu::entry("About"),
                "href",
                menu::ABOUT_HREF,
            )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::Target;

    fn find<'a>(suite: &'a TestSuite, name: &str) -> &'a Scenario {
        suite.scenarios.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_sort_scenarios() {
        let suite = suite();
        let za = find(&suite, "sort by name (za)");
        let last = za.steps.last().unwrap();
        assert_eq!(
            last.action,
            Some(Action::select(inventory_page::sort(), "za"))
        );
        assert_eq!(
            last.expectations,
            [Expectation::text(
                inventory_page::first_name(),
                "Test.allTheThings() T-Shirt (Red)"
            )]
        );
    }

    #[test]
    fn test_listing_checks_every_card() {
        let suite = suite();
        let listing = find(&suite, "products list");
        let checks = &listing.steps.last().unwrap().expectations;
        assert_eq!(checks.len(), CATALOGUE_SIZE * 4 + 1);
    }

    #[test]
    fn test_every_scenario_logs_in_first() {
        let suite = suite();
        for scenario in &suite.scenarios {
            assert_eq!(
                scenario.steps[0].action,
                Some(Action::login(super::super::STANDARD_USER)),
                "{}",
                scenario.name
            );
        }
    }

    #[test]
    fn test_totals_is_opt_in() {
        let suite = suite();
        let totals: Vec<_> = suite.scenarios.iter().filter(|s| s.has_tag("totals")).collect();
        assert_eq!(totals.len(), 1);
        assert!(!totals[0].has_tag("checkout"));
        let check = &totals[0].steps.last().unwrap().expectations[0];
        assert_eq!(check.target, Target::Element(checkout_page::total()));
    }

    #[test]
    fn test_remove_all_ends_with_empty_cart() {
        let suite = suite();
        let scenario = find(&suite, "removing every item clears the cart");
        let last = scenario.steps.last().unwrap();
        assert_eq!(last.action, Some(Action::Click(cart_widget::link())));
        assert!(last
            .expectations
            .contains(&Expectation::count(cart_page::items(), 0)));
    }
}
