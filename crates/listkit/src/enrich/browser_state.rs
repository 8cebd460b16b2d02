use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::error::EnrichError;

pub const COOKIES_FILE: &str = "cookies.json";
pub const USER_AGENT_FILE: &str = "userAgent.txt";

/// A cookie as written by the login flow's `page.cookies()` dump.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Seconds since the epoch; `-1` for session cookies.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl StoredCookie {
    /// Expiry worth sending to the browser; session cookies have none.
    pub fn persistent_expiry(&self) -> Option<f64> {
        self.expires.filter(|e| *e > 0.0)
    }
}

/// Authenticated browser identity produced by the external login flow.
#[derive(Debug, Clone)]
pub struct BrowserState {
    pub user_agent: String,
    pub cookies: Vec<StoredCookie>,
}

impl BrowserState {
    pub async fn load(session_directory: &Path) -> Result<Self, EnrichError> {
        let cookies_path = session_directory.join(COOKIES_FILE);
        let cookies_json = read(&cookies_path).await?;
        let cookies: Vec<StoredCookie> =
            serde_json::from_str(&cookies_json).map_err(|e| EnrichError::SessionParse {
                path: cookies_path.clone(),
                source: e,
            })?;

        let user_agent = read(&session_directory.join(USER_AGENT_FILE))
            .await?
            .trim()
            .to_string();

        debug!(cookies = cookies.len(), "Loaded browser session");
        Ok(Self {
            user_agent,
            cookies,
        })
    }
}

async fn read(path: &Path) -> Result<String, EnrichError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EnrichError::SessionRead {
            path: path.to_path_buf(),
            source: e,
        })
}
