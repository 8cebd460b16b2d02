use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::secrets::expand_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            catalog: CatalogConfig::default(),
            credentials: CredentialsConfig::default(),
            paths: PathsConfig::default(),
            enrichment: EnrichmentConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_video_retries")]
    pub video_retries: u32,
}

fn default_base_url() -> String {
    "https://openapi.etsy.com/v3/application".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_video_retries() -> u32 {
    3
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            video_retries: default_video_retries(),
        }
    }
}

/// Where the externally obtained credential, API key and shop identity live.
///
/// Each secret may be given directly, as a file, or as an env var name; see
/// [`crate::secrets::resolve_secret`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_token_file: Option<String>,
    #[serde(default = "default_access_token_env")]
    pub access_token_env: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

fn default_access_token_env() -> Option<String> {
    Some("LISTKIT_ACCESS_TOKEN".to_string())
}

fn default_api_key_env() -> Option<String> {
    Some("LISTKIT_API_KEY".to_string())
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            access_token_file: None,
            access_token_env: default_access_token_env(),
            api_key: None,
            api_key_file: None,
            api_key_env: default_api_key_env(),
            shop_id: None,
            user_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_export_directory")]
    pub export_directory: String,
    #[serde(default = "default_image_root")]
    pub image_root: String,
    /// Directory holding `cookies.json` and `userAgent.txt` from the login flow.
    #[serde(default = "default_session_directory")]
    pub session_directory: String,
}

fn default_export_directory() -> String {
    ".".to_string()
}

fn default_image_root() -> String {
    "listing_images".to_string()
}

fn default_session_directory() -> String {
    "database".to_string()
}

impl PathsConfig {
    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.export_directory))
    }

    pub fn image_root_dir(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.image_root))
    }

    pub fn session_dir(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.session_directory))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            export_directory: default_export_directory(),
            image_root: default_image_root(),
            session_directory: default_session_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_research_url")]
    pub research_url: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub chrome_executable: Option<String>,
    #[serde(default = "default_input_timeout")]
    pub input_timeout_secs: u64,
    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_secs: u64,
    #[serde(default = "default_settle_poll")]
    pub settle_poll_millis: u64,
    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_secs: u64,
    #[serde(default = "default_initial_render")]
    pub initial_render_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_research_url() -> String {
    "https://erank.com/keyword-explorer?country=USA&source=etsy".to_string()
}

fn default_input_timeout() -> u64 {
    20
}

fn default_settle_timeout() -> u64 {
    15
}

fn default_settle_poll() -> u64 {
    500
}

fn default_fallback_delay() -> u64 {
    10
}

fn default_initial_render() -> u64 {
    10
}

fn default_max_results() -> usize {
    10
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            research_url: default_research_url(),
            headless: false,
            chrome_executable: None,
            input_timeout_secs: default_input_timeout(),
            settle_timeout_secs: default_settle_timeout(),
            settle_poll_millis: default_settle_poll(),
            fallback_delay_secs: default_fallback_delay(),
            initial_render_secs: default_initial_render(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    #[serde(default)]
    pub upload_videos: bool,
}

fn default_max_images() -> usize {
    10
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
            upload_videos: false,
        }
    }
}
