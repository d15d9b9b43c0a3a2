use serde::Deserialize;

/// Main configuration structure for vlist-crawler
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the platform defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause before each page after the first (milliseconds)
    #[serde(rename = "pacing-delay-ms", default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Total time allowed for one request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Platform endpoints and the headers sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Paginated space search endpoint
    #[serde(rename = "search-url", default = "default_search_url")]
    pub search_url: String,

    /// Navigation endpoint that publishes the WBI signing keys
    #[serde(rename = "nav-url", default = "default_nav_url")]
    pub nav_url: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_referer")]
    pub referer: String,
}

/// Opaque device-fingerprint fields the search endpoint requires
///
/// These are copied into every page request verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintConfig {
    #[serde(rename = "dm-img-list", default = "default_dm_img_list")]
    pub dm_img_list: String,

    #[serde(rename = "dm-img-str", default = "default_dm_img_str")]
    pub dm_img_str: String,

    #[serde(rename = "dm-cover-img-str", default = "default_dm_cover_img_str")]
    pub dm_cover_img_str: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the exported files are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Write the tabular CSV export
    #[serde(default = "default_true")]
    pub csv: bool,

    /// Write the normalized JSON export
    #[serde(default = "default_true")]
    pub json: bool,

    /// Write the untouched platform records
    #[serde(rename = "raw-json", default = "default_true")]
    pub raw_json: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: default_pacing_delay_ms(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            nav_url: default_nav_url(),
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            dm_img_list: default_dm_img_list(),
            dm_img_str: default_dm_img_str(),
            dm_cover_img_str: default_dm_cover_img_str(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            csv: true,
            json: true,
            raw_json: true,
        }
    }
}

fn default_pacing_delay_ms() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_search_url() -> String {
    "https://api.bilibili.com/x/space/wbi/arc/search".to_string()
}

fn default_nav_url() -> String {
    "https://api.bilibili.com/x/web-interface/nav".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_referer() -> String {
    "https://space.bilibili.com/".to_string()
}

fn default_dm_img_list() -> String {
    "[]".to_string()
}

fn default_dm_img_str() -> String {
    "V2ViR0wgMS4wIChPcGVuR0wgRVMgMi4wIENocm9taXVtKQ".to_string()
}

fn default_dm_cover_img_str() -> String {
    "QU5HTEUgKEludGVsLCBJbnRlbChSKSBVSEQgR3JhcGhpY3MgKDB4MDAwMDlCQzQpIERpcmVjdDNEMTEgdnNfNV8wIHBzXzVfMCwgRDNEMTEpR29vZ2xlIEluYy4gKEludGVsKQ".to_string()
}

fn default_output_directory() -> String {
    "data".to_string()
}

fn default_true() -> bool {
    true
}
