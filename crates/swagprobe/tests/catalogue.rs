//! Runs the built-in scenario catalogue against a simulated storefront.
//!
//! The simulation re-renders the whole mock page after every click,
//! selection and navigation, registering elements under exactly the locators
//! the page objects hand out.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use swagprobe::storefront::{
    cart_page, cart_widget, checkout_page, inventory_page, item_page, login_page, menu,
};
use swagprobe::{
    suites, CredentialStore, MockDom, MockDriver, MockElement, MockSessionFactory, PollConfig,
    RunContext, ScenarioFilter, ScenarioStatus, SuiteRunner, Viewport, DEFAULT_BASE_URL,
};

const PRODUCTS: [(&str, f64); 6] = [
    ("Sauce Labs Backpack", 29.99),
    ("Sauce Labs Bike Light", 9.99),
    ("Sauce Labs Bolt T-Shirt", 15.99),
    ("Sauce Labs Fleece Jacket", 49.99),
    ("Sauce Labs Onesie", 7.99),
    ("Test.allTheThings() T-Shirt (Red)", 15.99),
];

const ACCEPTED: [&str; 5] = [
    "standard_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Login,
    Inventory,
    Item,
    Cart,
    StepOne,
    StepTwo,
    Complete,
}

impl Screen {
    const fn path(self) -> &'static str {
        match self {
            Self::Blank | Self::Login => "",
            Self::Inventory => inventory_page::PATH,
            Self::Item => "inventory-item.html?id=4",
            Self::Cart => cart_page::PATH,
            Self::StepOne => checkout_page::STEP_ONE_PATH,
            Self::StepTwo => checkout_page::STEP_TWO_PATH,
            Self::Complete => checkout_page::COMPLETE_PATH,
        }
    }
}

/// Storefront state behind one mock page
#[derive(Debug)]
struct Shop {
    screen: Screen,
    sort: String,
    cart: Vec<usize>,
    detail: usize,
    menu_open: bool,
    error: Option<String>,
    /// Sort options the shop ignores, to simulate a broken page
    broken_sort: bool,
    /// Show the login banner, then move on to the inventory anyway
    redirect_rejected: bool,
}

impl Shop {
    fn new() -> Self {
        Self {
            screen: Screen::Blank,
            sort: "az".to_string(),
            cart: Vec::new(),
            detail: 0,
            menu_open: false,
            error: None,
            broken_sort: false,
            redirect_rejected: false,
        }
    }

    fn order(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..PRODUCTS.len()).collect();
        if self.broken_sort {
            return ids;
        }
        match self.sort.as_str() {
            "za" => ids.sort_by(|a, b| PRODUCTS[*b].0.cmp(PRODUCTS[*a].0)),
            "lohi" => ids.sort_by(|a, b| PRODUCTS[*a].1.total_cmp(&PRODUCTS[*b].1)),
            "hilo" => ids.sort_by(|a, b| PRODUCTS[*b].1.total_cmp(&PRODUCTS[*a].1)),
            _ => ids.sort_by(|a, b| PRODUCTS[*a].0.cmp(PRODUCTS[*b].0)),
        }
        ids
    }

    fn go(&mut self, dom: &mut MockDom, screen: Screen) {
        self.screen = screen;
        self.menu_open = false;
        self.error = None;
        dom.url = format!("{DEFAULT_BASE_URL}{}", screen.path());
    }

    fn toggle(&mut self, product: usize) {
        if let Some(pos) = self.cart.iter().position(|p| *p == product) {
            let _ = self.cart.remove(pos);
        } else {
            self.cart.push(product);
        }
    }

    fn render(&self, dom: &mut MockDom) {
        dom.clear_elements();
        dom.set_element(&login_page::body(), MockElement::visible(""));
        match self.screen {
            Screen::Blank => {}
            Screen::Login => self.render_login(dom),
            Screen::Inventory => self.render_inventory(dom),
            Screen::Item => self.render_item(dom),
            Screen::Cart => self.render_cart(dom),
            Screen::StepOne => self.render_step_one(dom),
            Screen::StepTwo => self.render_step_two(dom),
            Screen::Complete => {
                dom.set_element(
                    &checkout_page::complete_header(),
                    MockElement::visible(checkout_page::THANK_YOU),
                );
                dom.set_element(&checkout_page::back_home(), MockElement::visible("Back Home"));
            }
        }
        if !matches!(self.screen, Screen::Blank | Screen::Login) {
            self.render_header(dom);
        }
    }

    fn render_login(&self, dom: &mut MockDom) {
        dom.set_element(&login_page::logo(), MockElement::visible("Swag Labs"));
        dom.set_element(&login_page::username(), MockElement::visible(""));
        dom.set_element(&login_page::password(), MockElement::visible(""));
        dom.set_element(&login_page::submit(), MockElement::visible("Login"));
        if let Some(error) = &self.error {
            dom.set_element(&login_page::error_container(), MockElement::visible(error));
            dom.set_element(&login_page::error_button(), MockElement::visible(""));
            dom.set_element(&login_page::message(error), MockElement::visible(error));
        }
    }

    fn render_header(&self, dom: &mut MockDom) {
        dom.set_element(&inventory_page::app_logo(), MockElement::visible("Swag Labs"));
        dom.set_element(&cart_widget::link(), MockElement::visible(""));
        if !self.cart.is_empty() {
            dom.set_element(
                &cart_widget::badge(),
                MockElement::visible(self.cart.len().to_string()),
            );
        }
        dom.set_element(&menu::open_button(), MockElement::visible("Open Menu"));
        if self.menu_open {
            dom.set_element(&menu::item_list(), MockElement::visible(menu::ENTRIES.join(" ")));
            for label in menu::ENTRIES {
                let mut entry = MockElement::visible(label);
                if label == "About" {
                    entry = entry.with_attribute("href", menu::ABOUT_HREF);
                }
                dom.set_element(&menu::entry(label), entry);
            }
        }
    }

    fn render_inventory(&self, dom: &mut MockDom) {
        let order = self.order();
        dom.set_element(&inventory_page::list(), MockElement::visible(""));
        dom.set_element(&inventory_page::sort(), MockElement::visible(""));
        dom.set_elements(
            &inventory_page::items(),
            order.iter().map(|p| MockElement::visible(PRODUCTS[*p].0)).collect(),
        );
        for (i, product) in order.iter().enumerate() {
            let i = i32::try_from(i).unwrap();
            let (name, price) = PRODUCTS[*product];
            dom.set_element(&inventory_page::item_image(i), MockElement::visible(""));
            dom.set_element(&inventory_page::item_name(i), MockElement::visible(name));
            dom.set_element(
                &inventory_page::item_description(i),
                MockElement::visible("carry.allTheThings()"),
            );
            dom.set_element(
                &inventory_page::item_price(i),
                MockElement::visible(format!("${price:.2}")),
            );
            if self.cart.contains(product) {
                dom.set_element(&inventory_page::remove(i), MockElement::visible("Remove"));
            } else {
                dom.set_element(
                    &inventory_page::add_to_cart(i),
                    MockElement::visible("Add to cart"),
                );
            }
        }
        let (first_name, first_price) = PRODUCTS[order[0]];
        dom.set_element(&inventory_page::first_name(), MockElement::visible(first_name));
        dom.set_element(
            &inventory_page::first_price(),
            MockElement::visible(format!("${first_price:.2}")),
        );
    }

    fn render_item(&self, dom: &mut MockDom) {
        let (name, price) = PRODUCTS[self.detail];
        dom.set_element(&item_page::image(), MockElement::visible(""));
        dom.set_element(&item_page::name(), MockElement::visible(name));
        dom.set_element(&item_page::description(), MockElement::visible("A description"));
        dom.set_element(&item_page::price(), MockElement::visible(format!("${price:.2}")));
        dom.set_element(&item_page::back(), MockElement::visible("Back to products"));
        if self.cart.contains(&self.detail) {
            dom.set_element(&item_page::remove(), MockElement::visible("Remove"));
        } else {
            dom.set_element(&item_page::add_to_cart(), MockElement::visible("Add to cart"));
        }
    }

    fn render_cart_lines(&self, dom: &mut MockDom, removable: bool) {
        dom.set_elements(
            &cart_page::items(),
            self.cart.iter().map(|p| MockElement::visible(PRODUCTS[*p].0)).collect(),
        );
        for (i, product) in self.cart.iter().enumerate() {
            let i = i32::try_from(i).unwrap();
            dom.set_element(&cart_page::item(i), MockElement::visible(PRODUCTS[*product].0));
            if removable {
                dom.set_element(&cart_page::remove(i), MockElement::visible("Remove"));
            }
        }
    }

    fn render_cart(&self, dom: &mut MockDom) {
        self.render_cart_lines(dom, true);
        dom.set_element(&cart_page::checkout(), MockElement::visible("Checkout"));
    }

    fn render_step_one(&self, dom: &mut MockDom) {
        dom.set_element(&checkout_page::first_name(), MockElement::visible(""));
        dom.set_element(&checkout_page::last_name(), MockElement::visible(""));
        dom.set_element(&checkout_page::postal_code(), MockElement::visible(""));
        dom.set_element(&checkout_page::continue_button(), MockElement::visible("Continue"));
        if let Some(error) = &self.error {
            dom.set_element(&checkout_page::error(), MockElement::visible(error));
        }
    }

    fn render_step_two(&self, dom: &mut MockDom) {
        self.render_cart_lines(dom, false);
        let subtotal: f64 = self.cart.iter().map(|p| PRODUCTS[*p].1).sum();
        let tax = (subtotal * 8.0).round() / 100.0;
        dom.set_element(
            &checkout_page::subtotal(),
            MockElement::visible(format!("Item total: ${subtotal:.2}")),
        );
        dom.set_element(&checkout_page::tax(), MockElement::visible(format!("Tax: ${tax:.2}")));
        dom.set_element(
            &checkout_page::total(),
            MockElement::visible(format!("Total: ${:.2}", subtotal + tax)),
        );
        dom.set_element(&checkout_page::cancel(), MockElement::visible("Cancel"));
        dom.set_element(&checkout_page::finish(), MockElement::visible("Finish"));
    }
}

type SharedShop = Arc<Mutex<Shop>>;

/// Register `handler` for clicks on `locator`, re-rendering afterwards
fn on_click<F>(dom: &mut MockDom, shop: &SharedShop, locator: &swagprobe::Locator, handler: F)
where
    F: Fn(&mut Shop, &mut MockDom) + Send + Sync + 'static,
{
    let shop = Arc::clone(shop);
    dom.on_click(locator, move |dom, _| {
        let mut shop = shop.lock().unwrap();
        handler(&mut shop, dom);
        shop.render(dom);
    });
}

fn storefront(broken_sort: bool) -> MockDriver {
    storefront_with(|shop| shop.broken_sort = broken_sort)
}

fn storefront_with(configure: impl FnOnce(&mut Shop)) -> MockDriver {
    let driver = MockDriver::new();
    let shop: SharedShop = Arc::new(Mutex::new(Shop::new()));
    configure(&mut shop.lock().unwrap());
    let mut dom = driver.dom();

    {
        let shop = Arc::clone(&shop);
        dom.on_navigate(move |dom, url| {
            let mut shop = shop.lock().unwrap();
            let path = url.strip_prefix(DEFAULT_BASE_URL).unwrap_or(url);
            let screen = match path {
                "" => Screen::Login,
                p if p.starts_with(inventory_page::PATH) => Screen::Inventory,
                p if p.starts_with(cart_page::PATH) => Screen::Cart,
                _ => Screen::Blank,
            };
            shop.screen = screen;
            shop.render(dom);
        });
    }

    on_click(&mut dom, &shop, &login_page::submit(), |shop, dom| {
        let user = dom.value(&login_page::username()).unwrap_or_default().to_string();
        let pass = dom.value(&login_page::password()).unwrap_or_default().to_string();
        if pass == "secret_sauce" && ACCEPTED.contains(&user.as_str()) {
            shop.go(dom, Screen::Inventory);
        } else if pass == "secret_sauce" && user == "locked_out_user" {
            shop.error = Some(login_page::LOCKED_OUT.to_string());
        } else {
            shop.error = Some(login_page::BAD_CREDENTIALS.to_string());
        }
        if shop.error.is_some() && shop.redirect_rejected {
            dom.url = format!("{DEFAULT_BASE_URL}{}", inventory_page::PATH);
        }
    });

    for i in 0..PRODUCTS.len() {
        let index = i32::try_from(i).unwrap();
        on_click(&mut dom, &shop, &inventory_page::add_to_cart(index), move |shop, _| {
            let product = shop.order()[i];
            shop.toggle(product);
        });
        on_click(&mut dom, &shop, &inventory_page::remove(index), move |shop, _| {
            let product = shop.order()[i];
            shop.toggle(product);
        });
        on_click(&mut dom, &shop, &cart_page::remove(index), move |shop, _| {
            if i < shop.cart.len() {
                let _ = shop.cart.remove(i);
            }
        });
    }

    {
        let shop = Arc::clone(&shop);
        dom.on_select(&inventory_page::sort(), move |dom, value| {
            let mut shop = shop.lock().unwrap();
            shop.sort = value.to_string();
            shop.render(dom);
        });
    }

    on_click(&mut dom, &shop, &inventory_page::first_name(), |shop, dom| {
        shop.detail = shop.order()[0];
        shop.go(dom, Screen::Item);
    });
    on_click(&mut dom, &shop, &item_page::add_to_cart(), |shop, _| {
        let product = shop.detail;
        shop.toggle(product);
    });
    on_click(&mut dom, &shop, &item_page::remove(), |shop, _| {
        let product = shop.detail;
        shop.toggle(product);
    });
    // Details page and confirmation page share the same back button hook
    on_click(&mut dom, &shop, &item_page::back(), |shop, dom| {
        if shop.screen == Screen::Complete {
            shop.cart.clear();
        }
        shop.go(dom, Screen::Inventory);
    });
    on_click(&mut dom, &shop, &cart_widget::link(), |shop, dom| {
        shop.go(dom, Screen::Cart);
    });
    on_click(&mut dom, &shop, &cart_page::checkout(), |shop, dom| {
        shop.go(dom, Screen::StepOne);
    });
    on_click(&mut dom, &shop, &checkout_page::continue_button(), |shop, dom| {
        let filled = |loc: swagprobe::Locator| dom.value(&loc).is_some_and(|v| !v.is_empty());
        let error = if !filled(checkout_page::first_name()) {
            Some("Error: First Name is required")
        } else if !filled(checkout_page::last_name()) {
            Some("Error: Last Name is required")
        } else if !filled(checkout_page::postal_code()) {
            Some("Error: Postal Code is required")
        } else {
            None
        };
        match error {
            Some(message) => shop.error = Some(message.to_string()),
            None => shop.go(dom, Screen::StepTwo),
        }
    });
    on_click(&mut dom, &shop, &checkout_page::cancel(), |shop, dom| {
        shop.go(dom, Screen::Inventory);
    });
    on_click(&mut dom, &shop, &checkout_page::finish(), |shop, dom| {
        shop.cart.clear();
        shop.go(dom, Screen::Complete);
    });
    on_click(&mut dom, &shop, &menu::open_button(), |shop, _| {
        shop.menu_open = true;
    });
    on_click(&mut dom, &shop, &menu::entry("All Items"), |shop, dom| {
        shop.go(dom, Screen::Inventory);
    });

    drop(dom);
    driver
}

fn context() -> RunContext {
    RunContext::new(Arc::new(CredentialStore::builtin().unwrap()))
        .with_poll(PollConfig::new(Duration::from_millis(300)).with_interval(Duration::from_millis(5)))
}

#[tokio::test]
async fn test_full_catalogue_passes_against_simulated_storefront() {
    let registry = suites::registry().unwrap();
    let selected = registry.select(&ScenarioFilter::new());
    let factory = MockSessionFactory::new(|| storefront(false));

    let summary = SuiteRunner::new(4)
        .run(&factory, &context(), &selected, |_| {})
        .await;

    for report in summary.failures() {
        eprintln!(
            "{} -> {}",
            report.full_name(),
            report.outcome.failure().unwrap()
        );
    }
    assert!(summary.all_passed());
    assert_eq!(summary.total(), registry.len());
    assert_eq!(factory.opened(), registry.len());
    assert!(factory.drivers().iter().all(|d| d.dom().is_closed()));
}

#[tokio::test]
async fn test_broken_sort_fails_only_sort_scenarios() {
    let registry = suites::registry().unwrap();
    let filter = ScenarioFilter::new().with_suite("inventory");
    let selected = registry.select(&filter);
    let factory = MockSessionFactory::new(|| storefront(true));

    let summary = SuiteRunner::new(0)
        .run(&factory, &context(), &selected, |_| {})
        .await;

    let failed: Vec<String> = summary.failures().iter().map(|r| r.name.clone()).collect();
    assert_eq!(
        failed,
        ["sort by name (za)", "sort by price (lohi)", "sort by price (hilo)"]
    );
    for report in summary.failures() {
        assert_eq!(report.status(), ScenarioStatus::Failed);
        let failure = report.outcome.failure().unwrap();
        assert!(failure.error.to_string().contains("last observed"));
    }
}

#[tokio::test]
async fn test_responsive_suite_sets_each_viewport() {
    let registry = suites::registry().unwrap();
    let selected = registry.select(&ScenarioFilter::new().with_tag("responsive"));
    let factory = MockSessionFactory::new(|| storefront(false));

    let summary = SuiteRunner::new(1)
        .run(&factory, &context(), &selected, |_| {})
        .await;

    assert!(summary.all_passed());
    let viewports: Vec<Viewport> = factory.drivers().iter().map(|d| d.dom().viewport).collect();
    assert_eq!(
        viewports,
        [Viewport::DESKTOP, Viewport::TABLET, Viewport::MOBILE]
    );
}

#[tokio::test]
async fn test_rejected_logins_stay_on_form() {
    let registry = suites::registry().unwrap();
    let filter = ScenarioFilter::new()
        .with_suite("login")
        .with_name("*locked*")
        .unwrap();
    let selected = registry.select(&filter);
    assert_eq!(selected.len(), 1);
    let factory = MockSessionFactory::new(|| storefront(false));

    let summary = SuiteRunner::new(1)
        .run(&factory, &context(), &selected, |_| {})
        .await;

    assert!(summary.all_passed());
    let driver = &factory.drivers()[0];
    assert_eq!(driver.dom().url, DEFAULT_BASE_URL);
}

#[tokio::test]
async fn test_rejected_login_that_redirects_fails() {
    let registry = suites::registry().unwrap();
    let filter = ScenarioFilter::new()
        .with_suite("login")
        .with_name("*credentials")
        .unwrap();
    let mut selected = registry.select(&filter);
    selected.retain(|s| s.name != "valid credentials");
    let locked = ScenarioFilter::new().with_name("locked out user").unwrap();
    selected.extend(registry.select(&locked));
    assert_eq!(selected.len(), 2);
    let factory =
        MockSessionFactory::new(|| storefront_with(|shop| shop.redirect_rejected = true));

    let summary = SuiteRunner::new(2)
        .run(&factory, &context(), &selected, |_| {})
        .await;

    assert_eq!(summary.failed(), 2);
    for report in &summary.reports {
        let failure = report.outcome.failure().unwrap();
        assert!(failure.description.contains(".html"), "{failure}");
    }
}
