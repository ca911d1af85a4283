//! Page objects for the Swag Labs storefront.
//!
//! Each submodule describes one page: the path it lives at and the locators
//! scenarios interact with. Nothing here touches a browser; these are plain
//! values composed into scenario steps.

use crate::locator::Locator;

/// Products on the stock inventory page
pub const CATALOGUE_SIZE: usize = 6;

/// Login page (`/`)
pub mod login_page {
    use super::Locator;

    /// Path
    pub const PATH: &str = "";

    /// Banner text for unknown users or wrong passwords
    pub const BAD_CREDENTIALS: &str =
        "Epic sadface: Username and password do not match any user in this service";

    /// Banner text for the locked-out persona
    pub const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";

    /// Logo above the form
    #[must_use]
    pub fn logo() -> Locator {
        Locator::css(".login_logo")
    }

    /// Page body
    #[must_use]
    pub fn body() -> Locator {
        Locator::css("body")
    }

    /// Username input
    #[must_use]
    pub fn username() -> Locator {
        Locator::css("#user-name")
    }

    /// Password input
    #[must_use]
    pub fn password() -> Locator {
        Locator::css("#password")
    }

    /// Submit button
    #[must_use]
    pub fn submit() -> Locator {
        Locator::css("#login-button")
    }

    /// Error banner container
    #[must_use]
    pub fn error_container() -> Locator {
        Locator::css(".error-message-container")
    }

    /// Dismiss button shown inside the error banner
    #[must_use]
    pub fn error_button() -> Locator {
        Locator::css(".error-button")
    }

    /// Element showing exactly `message`
    #[must_use]
    pub fn message(message: &str) -> Locator {
        Locator::text(message)
    }
}

/// Inventory page (`inventory.html`)
pub mod inventory_page {
    use super::Locator;

    /// Path
    pub const PATH: &str = "inventory.html";

    /// Header branding shown once logged in
    #[must_use]
    pub fn app_logo() -> Locator {
        Locator::text("Swag Labs")
    }

    /// Product grid
    #[must_use]
    pub fn list() -> Locator {
        Locator::css(".inventory_list")
    }

    /// Every product card
    #[must_use]
    pub fn items() -> Locator {
        Locator::css(".inventory_item")
    }

    /// Product card at `index`
    #[must_use]
    pub fn item(index: i32) -> Locator {
        items().nth(index)
    }

    /// Image of the card at `index`
    #[must_use]
    pub fn item_image(index: i32) -> Locator {
        item(index).locator(Locator::css("img.inventory_item_img"))
    }

    /// Name of the card at `index`
    #[must_use]
    pub fn item_name(index: i32) -> Locator {
        item(index).locator(Locator::css(".inventory_item_name"))
    }

    /// Description of the card at `index`
    #[must_use]
    pub fn item_description(index: i32) -> Locator {
        item(index).locator(Locator::css(".inventory_item_desc"))
    }

    /// Price of the card at `index`
    #[must_use]
    pub fn item_price(index: i32) -> Locator {
        item(index).locator(Locator::css(".inventory_item_price"))
    }

    /// "Add to cart" button of the card at `index`
    #[must_use]
    pub fn add_to_cart(index: i32) -> Locator {
        item(index).locator(Locator::text("Add to cart"))
    }

    /// "Remove" button of the card at `index`
    #[must_use]
    pub fn remove(index: i32) -> Locator {
        item(index).locator(Locator::text("Remove"))
    }

    /// First product name in the current ordering
    #[must_use]
    pub fn first_name() -> Locator {
        Locator::css(".inventory_item_name").first()
    }

    /// First product price in the current ordering
    #[must_use]
    pub fn first_price() -> Locator {
        Locator::css(".inventory_item_price").first()
    }

    /// Sort dropdown
    #[must_use]
    pub fn sort() -> Locator {
        Locator::css(".product_sort_container")
    }
}

/// Product details page (`inventory-item.html`)
pub mod item_page {
    use super::Locator;

    /// Path
    pub const PATH: &str = "inventory-item.html";

    /// Product image
    #[must_use]
    pub fn image() -> Locator {
        Locator::css(".inventory_details_img")
    }

    /// Product name
    #[must_use]
    pub fn name() -> Locator {
        Locator::css(".inventory_details_name")
    }

    /// Product description
    #[must_use]
    pub fn description() -> Locator {
        Locator::css(".inventory_details_desc")
    }

    /// Product price
    #[must_use]
    pub fn price() -> Locator {
        Locator::css(".inventory_details_price")
    }

    /// Button labelled "Add to cart"
    #[must_use]
    pub fn add_to_cart() -> Locator {
        Locator::css("button").filter_has_text("Add to cart")
    }

    /// Button labelled "Remove"
    #[must_use]
    pub fn remove() -> Locator {
        Locator::css("button").filter_has_text("Remove")
    }

    /// Back to the inventory
    #[must_use]
    pub fn back() -> Locator {
        Locator::test_id("back-to-products")
    }
}

/// Header cart widget, present on every logged-in page
pub mod cart_widget {
    use super::Locator;

    /// Item count badge; absent when the cart is empty
    #[must_use]
    pub fn badge() -> Locator {
        Locator::css(".shopping_cart_badge")
    }

    /// Link to the cart page
    #[must_use]
    pub fn link() -> Locator {
        Locator::css(".shopping_cart_link")
    }
}

/// Cart page (`cart.html`)
pub mod cart_page {
    use super::Locator;

    /// Path
    pub const PATH: &str = "cart.html";

    /// Every line in the cart
    #[must_use]
    pub fn items() -> Locator {
        Locator::css(".cart_item")
    }

    /// Cart line at `index`
    #[must_use]
    pub fn item(index: i32) -> Locator {
        items().nth(index)
    }

    /// "Remove" button of the cart line at `index`
    #[must_use]
    pub fn remove(index: i32) -> Locator {
        item(index).locator(Locator::text("Remove"))
    }

    /// Proceed to checkout
    #[must_use]
    pub fn checkout() -> Locator {
        Locator::text("Checkout")
    }
}

/// Checkout pages (`checkout-step-one.html`, `checkout-step-two.html`, `checkout-complete.html`)
pub mod checkout_page {
    use super::Locator;

    /// Customer information form
    pub const STEP_ONE_PATH: &str = "checkout-step-one.html";
    /// Order overview
    pub const STEP_TWO_PATH: &str = "checkout-step-two.html";
    /// Confirmation
    pub const COMPLETE_PATH: &str = "checkout-complete.html";

    /// Confirmation header text
    pub const THANK_YOU: &str = "Thank you for your order!";

    /// First name input
    #[must_use]
    pub fn first_name() -> Locator {
        Locator::test_id("firstName")
    }

    /// Last name input
    #[must_use]
    pub fn last_name() -> Locator {
        Locator::test_id("lastName")
    }

    /// Postal code input
    #[must_use]
    pub fn postal_code() -> Locator {
        Locator::test_id("postalCode")
    }

    /// Continue to the overview
    #[must_use]
    pub fn continue_button() -> Locator {
        Locator::test_id("continue")
    }

    /// Validation error banner
    #[must_use]
    pub fn error() -> Locator {
        Locator::test_id("error")
    }

    /// Item total label
    #[must_use]
    pub fn subtotal() -> Locator {
        Locator::css(".summary_subtotal_label")
    }

    /// Tax label
    #[must_use]
    pub fn tax() -> Locator {
        Locator::css(".summary_tax_label")
    }

    /// Grand total label
    #[must_use]
    pub fn total() -> Locator {
        Locator::css(".summary_total_label")
    }

    /// Abandon the order
    #[must_use]
    pub fn cancel() -> Locator {
        Locator::text("Cancel")
    }

    /// Place the order
    #[must_use]
    pub fn finish() -> Locator {
        Locator::text("Finish")
    }

    /// Confirmation header
    #[must_use]
    pub fn complete_header() -> Locator {
        Locator::css(".complete-header")
    }

    /// Back to the inventory from the confirmation page
    #[must_use]
    pub fn back_home() -> Locator {
        Locator::test_id("back-to-products")
    }
}

/// Burger menu
pub mod menu {
    use super::Locator;

    /// Where "About" points
    pub const ABOUT_HREF: &str = "https://saucelabs.com/";

    /// Entries, in display order
    pub const ENTRIES: [&str; 4] = ["All Items", "About", "Logout", "Reset App State"];

    /// Burger button
    #[must_use]
    pub fn open_button() -> Locator {
        Locator::css("#react-burger-menu-btn")
    }

    /// Entry list panel
    #[must_use]
    pub fn item_list() -> Locator {
        Locator::css(".bm-item-list")
    }

    /// Entry with exactly this label
    #[must_use]
    pub fn entry(label: &str) -> Locator {
        Locator::text(label)
    }
}
