//! [`ResearchPage`] over the Chrome DevTools Protocol.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, CookieSameSite, SetUserAgentOverrideParams, TimeSinceEpoch,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EnrichmentConfig;
use crate::sanitize;

use super::browser_state::{BrowserState, StoredCookie};
use super::error::EnrichError;
use super::page::ResearchPage;

fn page_error(e: CdpError) -> EnrichError {
    EnrichError::Page(e.to_string())
}

fn cookie_param(cookie: &StoredCookie) -> Result<CookieParam, EnrichError> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .secure(cookie.secure)
        .http_only(cookie.http_only);
    if let Some(domain) = &cookie.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(path) = &cookie.path {
        builder = builder.path(path.clone());
    }
    if let Some(expires) = cookie.persistent_expiry() {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }
    match cookie.same_site.as_deref() {
        Some("Strict") => builder = builder.same_site(CookieSameSite::Strict),
        Some("Lax") => builder = builder.same_site(CookieSameSite::Lax),
        Some("None") => builder = builder.same_site(CookieSameSite::None),
        _ => {}
    }
    builder.build().map_err(|message| EnrichError::InvalidCookie {
        name: cookie.name.clone(),
        message,
    })
}

/// Builds a JS expression over `document.querySelectorAll(selector)`.
fn query_all(selector: &str) -> Result<String, EnrichError> {
    let quoted = serde_json::to_string(selector).map_err(|e| EnrichError::Page(e.to_string()))?;
    Ok(format!("document.querySelectorAll({})", quoted))
}

/// A single Chromium tab driven over CDP. Owns the browser process.
pub struct ChromiumPage {
    browser: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    page: Page,
    focused: Mutex<Option<Element>>,
}

impl ChromiumPage {
    /// Launches Chromium, applies the stored identity, and opens the
    /// research URL.
    pub async fn launch(config: &EnrichmentConfig, state: &BrowserState) -> Result<Self, EnrichError> {
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let browser_config = builder.build().map_err(EnrichError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| EnrichError::Launch(e.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });

        let page = match Self::open(&browser, config, state).await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                handler.abort();
                return Err(e);
            }
        };

        info!(url = %sanitize::redact_url(&config.research_url), "Opened research page");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler,
            page,
            focused: Mutex::new(None),
        })
    }

    async fn open(
        browser: &Browser,
        config: &EnrichmentConfig,
        state: &BrowserState,
    ) -> Result<Page, EnrichError> {
        let page = browser.new_page("about:blank").await.map_err(page_error)?;
        page.set_user_agent(SetUserAgentOverrideParams::new(state.user_agent.clone()))
            .await
            .map_err(page_error)?;

        let cookies = state
            .cookies
            .iter()
            .map(cookie_param)
            .collect::<Result<Vec<_>, _>>()?;
        if !cookies.is_empty() {
            page.set_cookies(cookies).await.map_err(page_error)?;
        }

        page.goto(config.research_url.as_str())
            .await
            .map_err(|e| EnrichError::Navigation {
                url: sanitize::redact_url(&config.research_url),
                message: e.to_string(),
            })?;
        Ok(page)
    }

    async fn focused_element(&self) -> Result<Element, EnrichError> {
        self.focused
            .lock()
            .await
            .take()
            .ok_or_else(|| EnrichError::Page("no input focused".to_string()))
    }
}

#[async_trait]
impl ResearchPage for ChromiumPage {
    async fn count_elements(&self, selector: &str) -> Result<usize, EnrichError> {
        let expression = format!("{}.length", query_all(selector)?);
        self.page
            .evaluate(expression)
            .await
            .map_err(page_error)?
            .into_value::<usize>()
            .map_err(|e| EnrichError::Page(e.to_string()))
    }

    async fn clear_and_focus(&self, selector: &str, index: usize) -> Result<(), EnrichError> {
        let mut elements = self.page.find_elements(selector).await.map_err(page_error)?;
        if index >= elements.len() {
            return Err(EnrichError::Page(format!(
                "only {} '{}' inputs on page",
                elements.len(),
                selector
            )));
        }
        let element = elements.swap_remove(index);
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(page_error)?;
        element.focus().await.map_err(page_error)?;
        element.click().await.map_err(page_error)?;
        *self.focused.lock().await = Some(element);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), EnrichError> {
        let element = self.focused_element().await?;
        element.type_str(text).await.map_err(page_error)?;
        *self.focused.lock().await = Some(element);
        Ok(())
    }

    async fn press_enter(&self) -> Result<(), EnrichError> {
        let element = self.focused_element().await?;
        element.press_key("Enter").await.map_err(page_error)?;
        Ok(())
    }

    async fn read_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, EnrichError> {
        let expression = format!(
            "Array.from({}).slice(0, {}).map(a => (a.textContent || '').trim())",
            query_all(selector)?,
            limit
        );
        self.page
            .evaluate(expression)
            .await
            .map_err(page_error)?
            .into_value::<Vec<String>>()
            .map_err(|e| EnrichError::Page(e.to_string()))
    }

    async fn close(&self) -> Result<(), EnrichError> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        let closed = browser.close().await.map_err(page_error);
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "Browser process did not exit cleanly");
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(same_site: Option<&str>, expires: Option<f64>) -> StoredCookie {
        StoredCookie {
            name: "sid".to_string(),
            value: "abc".to_string(),
            domain: Some(".erank.com".to_string()),
            path: Some("/".to_string()),
            expires,
            http_only: true,
            secure: true,
            same_site: same_site.map(str::to_string),
        }
    }

    #[test]
    fn test_cookie_param_maps_fields() {
        let param = cookie_param(&cookie(Some("Lax"), Some(1999999999.0))).unwrap();
        assert_eq!(param.name, "sid");
        assert_eq!(param.domain.as_deref(), Some(".erank.com"));
        assert_eq!(param.same_site, Some(CookieSameSite::Lax));
        assert!(param.expires.is_some());
    }

    #[test]
    fn test_session_cookie_has_no_expiry() {
        let param = cookie_param(&cookie(None, Some(-1.0))).unwrap();
        assert!(param.expires.is_none());
        assert!(param.same_site.is_none());
    }

    #[test]
    fn test_query_all_escapes_selector() {
        assert_eq!(
            query_all(r#"input[name="keywords"]"#).unwrap(),
            r#"document.querySelectorAll("input[name=\"keywords\"]")"#
        );
    }
}
