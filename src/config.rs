/// Default deployment probed when no base URL is given
pub const DEFAULT_BASE_URL: &str = "https://agent-alarm-3.preview.emergentagent.com/api";

/// Harness configuration
pub struct Config {
    /// Base URL of the portal API, including the `/api` prefix
    pub base_url: String,

    /// Per-request timeout (s)
    pub timeout_secs: u64,

    /// Print the full result log as JSON at the end of the run
    pub show_results: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            show_results: false,
        }
    }
}
