//! Polling assertions.
//!
//! ```ignore
//! expect(&session, Target::page()).to_have_url(UrlPattern::contains("inventory.html")).await?;
//! expect(&session, Locator::css(".shopping_cart_badge")).to_have_text("2").await?;
//! ```
//!
//! Each call polls the live page through [`poll_until`] and fails with
//! `AssertionTimeout` carrying the last observed value.

use crate::driver::ElementSnapshot;
use crate::locator::{normalize, Locator};
use crate::result::{ProbeError, ProbeResult};
use crate::session::PageSession;
use crate::wait::{poll_until, PollConfig, PollOutcome};
use regex::Regex;
use std::fmt;
use std::time::Duration;

/// URL matcher
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(Regex),
    /// Does not contain substring
    Excludes(String),
}

impl UrlPattern {
    /// Match URLs containing `fragment`
    #[must_use]
    pub fn contains(fragment: impl Into<String>) -> Self {
        Self::Contains(fragment.into())
    }

    /// Match URLs that do not contain `fragment`
    #[must_use]
    pub fn excludes(fragment: impl Into<String>) -> Self {
        Self::Excludes(fragment.into())
    }

    /// Match URLs equal to `url`
    #[must_use]
    pub fn exact(url: impl Into<String>) -> Self {
        Self::Exact(url.into())
    }

    /// Match URLs against a regular expression
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the expression does not compile
    pub fn regex(pattern: &str) -> ProbeResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| ProbeError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => url == expected,
            Self::Contains(fragment) => url.contains(fragment.as_str()),
            Self::Regex(re) => re.is_match(url),
            Self::Excludes(fragment) => !url.contains(fragment.as_str()),
        }
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b))
            | (Self::Contains(a), Self::Contains(b))
            | (Self::Excludes(a), Self::Excludes(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(url) => write!(f, "{url}"),
            Self::Contains(fragment) => write!(f, "*{fragment}*"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Excludes(fragment) => write!(f, "!*{fragment}*"),
        }
    }
}

/// What an expectation is evaluated against
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The page itself (URL)
    Page,
    /// Elements resolved by a locator
    Element(Locator),
}

impl Target {
    /// The page itself
    #[must_use]
    pub const fn page() -> Self {
        Self::Page
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Element(locator)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => f.write_str("page"),
            Self::Element(locator) => write!(f, "{locator}"),
        }
    }
}

/// Condition polled against a target
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exactly one rendered element
    Visible,
    /// No match, or the match is not rendered
    Hidden,
    /// Normalized text equals
    TextEquals(String),
    /// Normalized text contains
    TextContains(String),
    /// Page URL matches
    UrlMatches(UrlPattern),
    /// Attribute has exactly this value
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Number of matches, ambiguity allowed
    CountEquals(usize),
    /// The amount in the target equals the sum of the amounts in `parts`
    AmountEqualsSumOf(Vec<Locator>),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("is visible"),
            Self::Hidden => f.write_str("is hidden"),
            Self::TextEquals(t) => write!(f, "has text {t:?}"),
            Self::TextContains(t) => write!(f, "contains text {t:?}"),
            Self::UrlMatches(p) => write!(f, "has URL matching {p}"),
            Self::AttributeEquals { name, value } => write!(f, "has {name}={value:?}"),
            Self::CountEquals(n) => write!(f, "has count {n}"),
            Self::AmountEqualsSumOf(parts) => {
                f.write_str("equals sum of ")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "[{part}]")?;
                }
                Ok(())
            }
        }
    }
}

/// A declarative condition with its target and optional timeout override
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    /// What is observed
    pub target: Target,
    /// What must hold
    pub condition: Condition,
    /// Overrides the session default when set
    pub timeout: Option<Duration>,
}

impl Expectation {
    /// Build an expectation, rejecting target/condition mismatches
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpectation` when a URL condition targets an element or vice versa
    pub fn new(target: impl Into<Target>, condition: Condition) -> ProbeResult<Self> {
        let target = target.into();
        match (&target, &condition) {
            (Target::Page, Condition::UrlMatches(_))
            | (Target::Element(_), Condition::Visible | Condition::Hidden)
            | (Target::Element(_), Condition::TextEquals(_) | Condition::TextContains(_))
            | (Target::Element(_), Condition::AttributeEquals { .. } | Condition::CountEquals(_))
            | (Target::Element(_), Condition::AmountEqualsSumOf(_)) => Ok(Self {
                target,
                condition,
                timeout: None,
            }),
            _ => Err(ProbeError::InvalidExpectation {
                message: format!("{target} cannot be checked with '{condition}'"),
            }),
        }
    }

    /// Page URL matches `pattern`
    #[must_use]
    pub fn url(pattern: UrlPattern) -> Self {
        Self {
            target: Target::Page,
            condition: Condition::UrlMatches(pattern),
            timeout: None,
        }
    }

    /// Element condition; element conditions always fit an element target
    #[must_use]
    pub fn element(locator: Locator, condition: Condition) -> Self {
        debug_assert!(!matches!(condition, Condition::UrlMatches(_)));
        Self {
            target: Target::Element(locator),
            condition,
            timeout: None,
        }
    }

    /// `locator` is visible
    #[must_use]
    pub fn visible(locator: Locator) -> Self {
        Self::element(locator, Condition::Visible)
    }

    /// `locator` is hidden or absent
    #[must_use]
    pub fn hidden(locator: Locator) -> Self {
        Self::element(locator, Condition::Hidden)
    }

    /// `locator` has exactly `text`
    #[must_use]
    pub fn text(locator: Locator, text: impl Into<String>) -> Self {
        Self::element(locator, Condition::TextEquals(text.into()))
    }

    /// `locator` contains `text`
    #[must_use]
    pub fn contains_text(locator: Locator, text: impl Into<String>) -> Self {
        Self::element(locator, Condition::TextContains(text.into()))
    }

    /// `locator` has attribute `name` equal to `value`
    #[must_use]
    pub fn attribute(locator: Locator, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::element(
            locator,
            Condition::AttributeEquals {
                name: name.into(),
                value: value.into(),
            },
        )
    }

    /// `locator` matches exactly `n` elements
    #[must_use]
    pub fn count(locator: Locator, n: usize) -> Self {
        Self::element(locator, Condition::CountEquals(n))
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target, self.condition)
    }
}

/// One observation of a target
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    /// Current page URL
    Url(String),
    /// Element state
    Element(ElementSnapshot),
    /// Target amount and part amounts
    Amounts {
        /// Parsed target amount
        total: Option<f64>,
        /// Parsed part amounts
        parts: Vec<Option<f64>>,
    },
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "URL {url}"),
            Self::Element(snap) => match (&snap.text, snap.count) {
                (Some(text), 1) => write!(f, "{snap}, text {text:?}"),
                _ => write!(f, "{snap}"),
            },
            Self::Amounts { total, parts } => {
                let fmt_amount =
                    |a: &Option<f64>| a.map_or_else(|| "?".to_string(), |v| format!("{v:.2}"));
                let parts: Vec<String> = parts.iter().map(fmt_amount).collect();
                write!(f, "total {} vs parts [{}]", fmt_amount(total), parts.join(", "))
            }
        }
    }
}

/// Extract the first decimal amount from text such as `"Total: $32.39"`
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(rest.len());
    rest[..end]
        .replace(',', "")
        .trim_end_matches('.')
        .parse()
        .ok()
}

impl Condition {
    /// Whether an observation satisfies this condition
    #[must_use]
    pub fn holds(&self, observed: &Observed, strict: bool) -> bool {
        match (self, observed) {
            (Self::UrlMatches(pattern), Observed::Url(url)) => pattern.matches(url),
            (Self::CountEquals(n), Observed::Element(snap)) => snap.count == *n,
            (Self::Hidden, Observed::Element(snap)) => snap.count == 0 || !snap.visible,
            (_, Observed::Element(snap)) if snap.count == 0 || (strict && snap.count > 1) => false,
            (Self::Visible, Observed::Element(snap)) => snap.visible,
            (Self::TextEquals(expected), Observed::Element(snap)) => {
                snap.text.as_deref() == Some(normalize(expected).as_str())
            }
            (Self::TextContains(expected), Observed::Element(snap)) => snap
                .text
                .as_deref()
                .is_some_and(|t| t.contains(normalize(expected).as_str())),
            (Self::AttributeEquals { value, .. }, Observed::Element(snap)) => {
                snap.attribute.as_deref() == Some(value.as_str())
            }
            (Self::AmountEqualsSumOf(_), Observed::Amounts { total, parts }) => {
                let Some(total) = total else { return false };
                let sum: Option<f64> = parts.iter().copied().sum();
                sum.is_some_and(|sum| (sum - total).abs() < 0.005)
            }
            _ => false,
        }
    }
}

/// Handle returned by [`expect`]
#[derive(Debug)]
pub struct Expect<'a> {
    session: &'a PageSession,
    target: Target,
}

/// Start an assertion against `target` in `session`
pub fn expect(session: &PageSession, target: impl Into<Target>) -> Expect<'_> {
    Expect {
        session,
        target: target.into(),
    }
}

impl Expect<'_> {
    /// Poll until `condition` holds; `timeout` overrides the session default
    ///
    /// # Errors
    ///
    /// Returns `AssertionTimeout` with the last observed value, or
    /// `InvalidExpectation` for a target/condition mismatch
    pub async fn to_satisfy(
        &self,
        condition: Condition,
        timeout: Option<Duration>,
    ) -> ProbeResult<Observed> {
        let mut expectation = Expectation::new(self.target.clone(), condition)?;
        expectation.timeout = timeout;
        check(self.session, &expectation).await
    }

    /// Element is visible
    pub async fn to_be_visible(&self) -> ProbeResult<Observed> {
        self.to_satisfy(Condition::Visible, None).await
    }

    /// Element is hidden or absent
    pub async fn to_be_hidden(&self) -> ProbeResult<Observed> {
        self.to_satisfy(Condition::Hidden, None).await
    }

    /// Element text equals `text`
    pub async fn to_have_text(&self, text: &str) -> ProbeResult<Observed> {
        self.to_satisfy(Condition::TextEquals(text.to_string()), None)
            .await
    }

    /// Element text contains `text`
    pub async fn to_contain_text(&self, text: &str) -> ProbeResult<Observed> {
        self.to_satisfy(Condition::TextContains(text.to_string()), None)
            .await
    }

    /// Page URL matches `pattern`
    pub async fn to_have_url(&self, pattern: UrlPattern) -> ProbeResult<Observed> {
        self.to_satisfy(Condition::UrlMatches(pattern), None).await
    }

    /// Element attribute equals `value`
    pub async fn to_have_attribute(&self, name: &str, value: &str) -> ProbeResult<Observed> {
        self.to_satisfy(
            Condition::AttributeEquals {
                name: name.to_string(),
                value: value.to_string(),
            },
            None,
        )
        .await
    }

    /// Locator matches exactly `n` elements
    pub async fn to_have_count(&self, n: usize) -> ProbeResult<Observed> {
        self.to_satisfy(Condition::CountEquals(n), None).await
    }
}

/// Poll one expectation against a session
///
/// # Errors
///
/// Returns `AssertionTimeout` carrying the last observed value when the
/// condition never holds, or the driver's error if observation fails
pub async fn check(session: &PageSession, expectation: &Expectation) -> ProbeResult<Observed> {
    let config = expectation
        .timeout
        .map_or(*session.poll(), |t| session.poll().with_timeout(t));
    let strict = match &expectation.target {
        Target::Element(locator) => locator.is_strict(),
        Target::Page => true,
    };

    let outcome = poll_until(
        &config,
        || observe(session, expectation),
        |observed| expectation.condition.holds(observed, strict),
    )
    .await?;

    match outcome {
        PollOutcome::Satisfied {
            value, attempts, ..
        } => {
            tracing::debug!(%expectation, attempts, "expectation met");
            Ok(value)
        }
        PollOutcome::TimedOut { last, attempts, .. } => {
            tracing::debug!(%expectation, attempts, last = %last, "expectation timed out");
            Err(ProbeError::AssertionTimeout {
                expectation: expectation.to_string(),
                last_observed: last.to_string(),
                timeout_ms: config.timeout_ms(),
            })
        }
    }
}

async fn observe(session: &PageSession, expectation: &Expectation) -> ProbeResult<Observed> {
    match (&expectation.target, &expectation.condition) {
        (Target::Page, _) => Ok(Observed::Url(session.url().await?)),
        (Target::Element(locator), Condition::AttributeEquals { name, .. }) => Ok(
            Observed::Element(session.query(locator, Some(name.as_str())).await?),
        ),
        (Target::Element(locator), Condition::AmountEqualsSumOf(parts)) => {
            let total = session.query(locator, None).await?;
            let mut amounts = Vec::with_capacity(parts.len());
            for part in parts {
                let snap = session.query(part, None).await?;
                amounts.push(snap.text.as_deref().and_then(parse_amount));
            }
            Ok(Observed::Amounts {
                total: total.text.as_deref().and_then(parse_amount),
                parts: amounts,
            })
        }
        (Target::Element(locator), _) => Ok(Observed::Element(session.query(locator, None).await?)),
    }
}
