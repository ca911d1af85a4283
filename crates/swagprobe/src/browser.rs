//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature this launches Chromium through chromiumoxide and
//! hands out one [`PageDriver`] per scenario, each in its own browser context
//! so cookies and local storage never leak between scenarios. Without the
//! feature, [`Browser::launch`] fails and only the mock driver is available.

use crate::result::{ProbeError, ProbeResult};
use std::time::Duration;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Budget for a single CDP request
    pub request_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the CDP request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Attribute used to hand a JS-resolved element over to CDP input dispatch
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const TARGET_ATTRIBUTE: &str = "data-swagprobe-target";

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::{BrowserConfig, ProbeError, ProbeResult, TARGET_ATTRIBUTE};
    use crate::driver::{ElementSnapshot, PageDriver, SessionFactory};
    use crate::emulation::Viewport;
    use crate::locator::Locator;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn page_error(e: impl std::fmt::Display) -> ProbeError {
        ProbeError::page(e.to_string())
    }

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance with real CDP
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder().request_timeout(config.request_timeout);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            // Spawn handler task
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            {
                let mut browser = self.inner.lock().await;
                let _ = browser
                    .close()
                    .await
                    .map_err(|e| ProbeError::BrowserLaunchError {
                        message: e.to_string(),
                    })?;
                let _ = browser.wait().await;
            }
            self.handle.abort();
            tracing::info!("browser closed");
            Ok(())
        }
    }

    #[async_trait]
    impl SessionFactory for Browser {
        async fn open(&self, viewport: Viewport) -> ProbeResult<Box<dyn PageDriver>> {
            let (context, page) = {
                let mut browser = self.inner.lock().await;
                let context = browser
                    .create_browser_context(CreateBrowserContextParams::default())
                    .await
                    .map_err(page_error)?;
                let target = CreateTargetParams::builder()
                    .url("about:blank")
                    .browser_context_id(context.clone())
                    .build()
                    .map_err(page_error)?;
                let page = browser.new_page(target).await.map_err(page_error)?;
                (context, page)
            };

            let mut driver = CdpDriver {
                page,
                context: Some(context),
                browser: Arc::clone(&self.inner),
            };
            driver.set_viewport(viewport).await?;
            Ok(Box::new(driver))
        }
    }

    /// One page in its own browser context
    #[derive(Debug)]
    pub struct CdpDriver {
        page: CdpPage,
        context: Option<BrowserContextId>,
        browser: Arc<Mutex<CdpBrowser>>,
    }

    impl CdpDriver {
        /// Run `body` with `el` bound to the single element `locator` resolves to
        async fn on_element(&self, locator: &Locator, body: &str) -> ProbeResult<()> {
            let js = format!(
                "(() => {{ const el = {collect}[0]; if (!el) {{ return false; }} {body} return true; }})()",
                collect = locator.to_collect_js(),
            );
            let found: bool = self
                .page
                .evaluate(js)
                .await
                .map_err(page_error)?
                .into_value()
                .map_err(page_error)?;
            if found {
                Ok(())
            } else {
                Err(ProbeError::page(format!("{locator} detached before input")))
            }
        }
    }

    #[async_trait]
    impl PageDriver for CdpDriver {
        async fn goto(&mut self, url: &str) -> ProbeResult<()> {
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| ProbeError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn set_viewport(&mut self, viewport: Viewport) -> ProbeResult<()> {
            let params = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(viewport.width))
                .height(i64::from(viewport.height))
                .device_scale_factor(1.0)
                .mobile(viewport.is_mobile())
                .build()
                .map_err(page_error)?;
            let _ = self.page.execute(params).await.map_err(page_error)?;
            Ok(())
        }

        async fn query(
            &self,
            locator: &Locator,
            attribute: Option<&str>,
        ) -> ProbeResult<ElementSnapshot> {
            // Evaluation fails while a navigation swaps the document; report
            // nothing and let the poll loop look again.
            match self.page.evaluate(locator.to_probe_js(attribute)).await {
                Ok(result) => result.into_value().map_err(page_error),
                Err(e) => {
                    tracing::trace!(%locator, error = %e, "probe evaluation failed");
                    Ok(ElementSnapshot::missing())
                }
            }
        }

        async fn click(&self, locator: &Locator) -> ProbeResult<()> {
            let token = uuid::Uuid::new_v4().to_string();
            self.on_element(
                locator,
                &format!(
                    "el.setAttribute('{TARGET_ATTRIBUTE}', '{token}'); el.scrollIntoView({{ block: 'center' }});"
                ),
            )
            .await?;
            let element = self
                .page
                .find_element(format!("[{TARGET_ATTRIBUTE}=\"{token}\"]"))
                .await
                .map_err(page_error)?;
            let _ = element.click().await.map_err(page_error)?;
            // The click may have navigated away; a stale marker is harmless.
            let _ = self
                .page
                .evaluate(format!(
                    "document.querySelector('[{TARGET_ATTRIBUTE}=\"{token}\"]')?.removeAttribute('{TARGET_ATTRIBUTE}')"
                ))
                .await;
            Ok(())
        }

        async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
            let value = serde_json::to_string(value)?;
            self.on_element(
                locator,
                &format!(
                    "const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                     el.focus(); \
                     Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {value}); \
                     el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                     el.dispatchEvent(new Event('change', {{ bubbles: true }}));"
                ),
            )
            .await
        }

        async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
            let value = serde_json::to_string(value)?;
            self.on_element(
                locator,
                &format!(
                    "if (!Array.from(el.options || []).some(o => o.value === {value})) {{ throw new Error('no option ' + {value}); }} \
                     Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set.call(el, {value}); \
                     el.dispatchEvent(new Event('change', {{ bubbles: true }}));"
                ),
            )
            .await
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| ProbeError::ScreenshotError {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ProbeError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn close(&mut self) -> ProbeResult<()> {
            let page_closed = self.page.clone().close().await.map_err(page_error);
            if let Some(context) = self.context.take() {
                let browser = self.browser.lock().await;
                browser
                    .dispose_browser_context(context)
                    .await
                    .map_err(page_error)?;
            }
            page_closed
        }
    }
}

// ============================================================================
// Stand-in when the `browser` feature is NOT enabled
// ============================================================================

#[cfg(not(feature = "browser"))]
#[allow(clippy::missing_const_for_fn)]
mod unavailable {
    use super::{BrowserConfig, ProbeError, ProbeResult};
    use crate::driver::{PageDriver, SessionFactory};
    use crate::emulation::Viewport;
    use async_trait::async_trait;

    /// Browser handle; cannot be launched without the `browser` feature
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// Always fails: this build has no CDP backend
        ///
        /// # Errors
        ///
        /// Always returns `BrowserLaunchError`
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let _ = config;
            Err(ProbeError::BrowserLaunchError {
                message: "built without the `browser` feature".to_string(),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl SessionFactory for Browser {
        async fn open(&self, _viewport: Viewport) -> ProbeResult<Box<dyn PageDriver>> {
            Err(ProbeError::BrowserLaunchError {
                message: "built without the `browser` feature".to_string(),
            })
        }
    }
}

// Re-export based on feature
#[cfg(feature = "browser")]
pub use cdp::{Browser, CdpDriver};

#[cfg(not(feature = "browser"))]
pub use unavailable::Browser;
