use serde::Deserialize;

/// Main configuration structure for Luma-Harvest
///
/// Every section is optional; a missing section falls back to the defaults
/// that match the public Lu.ma site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site description
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin used to resolve relative links and to recognise profile links
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Domain of the external social network profiles are resolved to
    #[serde(rename = "social-domain", default = "default_social_domain")]
    pub social_domain: String,

    /// URL fragments that mark a seed as a listing page
    #[serde(rename = "listing-markers", default = "default_listing_markers")]
    pub listing_markers: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            social_domain: default_social_domain(),
            listing_markers: default_listing_markers(),
        }
    }
}

/// HTTP fetch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Browser-like user agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Total attempts per URL, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on every further retry (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Pause after every successful fetch (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

/// Pipeline behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Number of profile resolutions in flight per event
    #[serde(
        rename = "max-concurrent-profiles",
        default = "default_max_concurrent_profiles"
    )]
    pub max_concurrent_profiles: usize,

    /// Participants kept per event; extra links are dropped
    #[serde(rename = "max-participants-per-event", default)]
    pub max_participants_per_event: Option<usize>,

    /// Whether event descriptions are kept in the records
    #[serde(rename = "include-description", default = "default_true")]
    pub include_description: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_profiles: default_max_concurrent_profiles(),
            max_participants_per_event: None,
            include_description: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the participant CSV file
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,

    /// Path of the JSON dump; derived from `csv_path` when unset
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            json_path: None,
        }
    }
}

impl OutputConfig {
    /// Returns the JSON path, replacing a `.csv` extension when none is configured
    pub fn resolved_json_path(&self) -> String {
        match &self.json_path {
            Some(path) => path.clone(),
            None => match self.csv_path.strip_suffix(".csv") {
                Some(stem) => format!("{}.json", stem),
                None => format!("{}.json", self.csv_path),
            },
        }
    }
}

fn default_base_url() -> String {
    "https://lu.ma".to_string()
}

fn default_social_domain() -> String {
    "linkedin.com".to_string()
}

fn default_listing_markers() -> Vec<String> {
    vec![
        "/discover".to_string(),
        "/calendar/".to_string(),
        "/c/".to_string(),
    ]
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_max_concurrent_profiles() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_csv_path() -> String {
    "luma_events_data.csv".to_string()
}
