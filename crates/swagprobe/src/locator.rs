//! Locator abstraction for element selection.
//!
//! A locator is a chain of steps evaluated left to right, each step narrowing
//! or re-rooting the current match set:
//!
//! ```text
//! css=.inventory_item >> nth=0 >> text=Add to cart
//! ```
//!
//! Locators are plain data. They compile to a JavaScript expression that the
//! CDP backend evaluates in the page, and render to a stable description that
//! doubles as the lookup key for [`crate::driver::MockDriver`].

use std::fmt;

/// Attribute the storefront uses for stable test hooks
pub const TEST_ID_ATTRIBUTE: &str = "data-test";

/// Tags whose text never counts as rendered page text
const NON_RENDERED_TAGS: &str = "HEAD,TITLE,SCRIPT,STYLE,NOSCRIPT,TEMPLATE,HTML";

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorStep {
    /// CSS selector evaluated inside every current root
    Css(String),
    /// Smallest elements whose normalized text contains the string (case-insensitive)
    Text(String),
    /// Element carrying `data-test="<id>"`
    TestId(String),
    /// Keep only current matches whose text contains the string
    HasText(String),
    /// Pick one match by index; negative counts from the end
    Nth(i32),
}

impl fmt::Display for LocatorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "test-id={id}"),
            Self::HasText(t) => write!(f, "has-text={t}"),
            Self::Nth(i) => write!(f, "nth={i}"),
        }
    }
}

/// A locator for finding elements on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    steps: Vec<LocatorStep>,
    strict: bool,
}

impl Locator {
    fn from_step(step: LocatorStep) -> Self {
        Self {
            steps: vec![step],
            strict: true,
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::Css(selector.into()))
    }

    /// Locate by visible text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::Text(text.into()))
    }

    /// Locate by `data-test` attribute
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::TestId(id.into()))
    }

    /// Scope another locator inside this one
    #[must_use]
    pub fn locator(mut self, inner: Self) -> Self {
        self.steps.extend(inner.steps);
        self
    }

    /// Keep only matches containing `text`
    #[must_use]
    pub fn filter_has_text(mut self, text: impl Into<String>) -> Self {
        self.steps.push(LocatorStep::HasText(text.into()));
        self
    }

    /// Pick the match at `index` (negative counts from the end)
    #[must_use]
    pub fn nth(mut self, index: i32) -> Self {
        self.steps.push(LocatorStep::Nth(index));
        self
    }

    /// First match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Last match
    #[must_use]
    pub fn last(self) -> Self {
        self.nth(-1)
    }

    /// Allow single-element conditions to use the first of several matches
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether ambiguous matches are rejected
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Steps of the chain
    #[must_use]
    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }

    /// Compile to a JavaScript expression yielding an `Array` of matching elements
    #[must_use]
    pub fn to_collect_js(&self) -> String {
        let mut js = String::from("(() => {\n");
        js.push_str("  const norm = s => (s || '').replace(/\\s+/g, ' ').trim();\n");
        js.push_str(&format!(
            "  const hidden = new Set({});\n",
            js_string(NON_RENDERED_TAGS)
        ));
        js.push_str("  const rendered = el => !hidden.has(el.tagName) && !el.closest('head');\n");
        js.push_str("  const uniq = xs => Array.from(new Set(xs));\n");
        js.push_str("  let cur = [document];\n");

        for step in &self.steps {
            match step {
                LocatorStep::Css(sel) => js.push_str(&format!(
                    "  cur = uniq(cur.flatMap(r => Array.from(r.querySelectorAll({}))));\n",
                    js_string(sel)
                )),
                LocatorStep::TestId(id) => js.push_str(&format!(
                    "  cur = uniq(cur.flatMap(r => Array.from(r.querySelectorAll({}))));\n",
                    js_string(&test_id_selector(id))
                )),
                LocatorStep::Text(text) => {
                    let needle = js_string(&normalize(text).to_lowercase());
                    js.push_str(&format!(
                        "  cur = uniq(cur.flatMap(r => Array.from(r.querySelectorAll('*')).filter(el => rendered(el) \
                         && norm(el.textContent).toLowerCase().includes({needle}) \
                         && !Array.from(el.children).some(c => norm(c.textContent).toLowerCase().includes({needle})))));\n"
                    ));
                }
                LocatorStep::HasText(text) => {
                    let needle = js_string(&normalize(text).to_lowercase());
                    js.push_str(&format!(
                        "  cur = cur.filter(el => el !== document && norm(el.textContent).toLowerCase().includes({needle}));\n"
                    ));
                }
                LocatorStep::Nth(i) => js.push_str(&format!(
                    "  cur = [{i} >= 0 ? cur[{i}] : cur[cur.length + ({i})]].filter(Boolean);\n"
                )),
            }
        }

        js.push_str("  return cur.filter(el => el !== document);\n})()");
        js
    }

    /// Compile to an expression returning `{count, visible, text, attribute}` for the first match
    #[must_use]
    pub fn to_probe_js(&self, attribute: Option<&str>) -> String {
        let attr = attribute.map_or_else(|| "null".to_string(), js_string);
        format!(
            "(() => {{\n  const els = {collect};\n  const el = els[0];\n  if (!el) {{ return {{ count: 0, visible: false, text: null, attribute: null }}; }}\n  \
             const rect = el.getBoundingClientRect();\n  const style = window.getComputedStyle(el);\n  \
             const visible = rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';\n  \
             const attr = {attr};\n  \
             return {{ count: els.length, visible, text: (el.textContent || '').replace(/\\s+/g, ' ').trim(), attribute: attr === null ? null : el.getAttribute(attr) }};\n}})()",
            collect = self.to_collect_js(),
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// CSS selector for a `data-test` hook
#[must_use]
pub fn test_id_selector(id: &str) -> String {
    format!("[{TEST_ID_ATTRIBUTE}={}]", js_string(id))
}

/// Collapse whitespace runs and trim, the way rendered text is compared
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Encode a Rust string as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_css_locator() {
            let loc = Locator::css(".inventory_item");
            assert_eq!(loc.steps(), &[LocatorStep::Css(".inventory_item".into())]);
            assert!(loc.is_strict());
        }

        #[test]
        fn test_chained_description() {
            let loc = Locator::css(".inventory_item")
                .first()
                .locator(Locator::text("Add to cart"));
            assert_eq!(
                loc.to_string(),
                "css=.inventory_item >> nth=0 >> text=Add to cart"
            );
        }

        #[test]
        fn test_filter_and_last() {
            let loc = Locator::css("button").filter_has_text("Remove").last();
            assert_eq!(loc.to_string(), "css=button >> has-text=Remove >> nth=-1");
        }

        #[test]
        fn test_test_id_description_and_selector() {
            let loc = Locator::test_id("firstName");
            assert_eq!(loc.to_string(), "test-id=firstName");
            assert_eq!(test_id_selector("firstName"), "[data-test=\"firstName\"]");
        }

        #[test]
        fn test_with_strict() {
            let loc = Locator::css("a").with_strict(false);
            assert!(!loc.is_strict());
        }
    }

    mod compile_tests {
        use super::*;

        #[test]
        fn test_css_compiles_to_query_selector_all() {
            let js = Locator::css("#login-button").to_collect_js();
            assert!(js.contains("querySelectorAll(\"#login-button\")"));
        }

        #[test]
        fn test_text_is_case_insensitive_needle() {
            let js = Locator::text("Swag  Labs").to_collect_js();
            assert!(js.contains("\"swag labs\""));
            assert!(js.contains("toLowerCase()"));
        }

        #[test]
        fn test_nth_negative() {
            let js = Locator::css("li").last().to_collect_js();
            assert!(js.contains("cur.length + (-1)"));
        }

        #[test]
        fn test_probe_includes_attribute() {
            let js = Locator::text("About").to_probe_js(Some("href"));
            assert!(js.contains("\"href\""));
            assert!(js.contains("getAttribute"));
        }

        #[test]
        fn test_probe_without_attribute() {
            let js = Locator::css("body").to_probe_js(None);
            assert!(js.contains("const attr = null"));
        }
    }

    mod normalize_tests {
        use super::*;

        #[test]
        fn test_normalize_collapses_whitespace() {
            assert_eq!(normalize("  Thank  you\n for   your order! "), "Thank you for your order!");
        }
    }

    proptest! {
        #[test]
        fn prop_text_needle_is_escaped_literal(text in "\\PC{0,40}") {
            let js = Locator::text(text.clone()).to_collect_js();
            let literal = serde_json::to_string(&normalize(&text).to_lowercase()).unwrap();
            prop_assert!(js.contains(&literal));
        }

        #[test]
        fn prop_description_has_one_separator_per_join(n in 1usize..6) {
            let mut loc = Locator::css("div");
            for _ in 1..n {
                loc = loc.first();
            }
            prop_assert_eq!(loc.to_string().matches(" >> ").count(), n - 1);
        }
    }
}
