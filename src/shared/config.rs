//! Application configuration. Backend URL, credentials, identity defaults.

use serde::Deserialize;

/// Default backend root for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Placeholder bearer token used when no credential is configured.
pub const PLACEHOLDER_TOKEN: &str = "test-token";

/// Fallback user identifier for unauthenticated testing.
pub const DEFAULT_FALLBACK_USER: &str = "demo-user";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Backend API root. Read from PULSEBOARD_API_URL.
    pub api_url: Option<String>,

    /// Bearer credential for the Authorization header. Read from PULSEBOARD_API_TOKEN.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Identity to bind at startup. Read from PULSEBOARD_USER_ID.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Identifier injected when no identity is bound. Read from PULSEBOARD_FALLBACK_USER.
    #[serde(default)]
    pub fallback_user: Option<String>,

    /// Permit backend calls without a bound identity (default true). Read from
    /// PULSEBOARD_ALLOW_ANONYMOUS.
    #[serde(default)]
    pub allow_anonymous: Option<bool>,

    /// Per-request timeout in seconds (default 30). A hung request surfaces as
    /// a Network error instead of indefinite Loading. Read from
    /// PULSEBOARD_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Use the canned mock backend instead of HTTP. Read from PULSEBOARD_USE_MOCK_BACKEND.
    #[serde(default)]
    pub use_mock_backend: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("PULSEBOARD"));
        if let Ok(path) = std::env::var("PULSEBOARD_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the backend API root. Defaults to the local development address.
    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Returns whether anonymous calls (fallback identifier) are permitted. Defaults to true.
    pub fn allow_anonymous_or_default(&self) -> bool {
        self.allow_anonymous.unwrap_or(true)
    }

    /// Returns the fallback user identifier. Defaults to "demo-user".
    pub fn fallback_user_or_default(&self) -> String {
        self.fallback_user
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK_USER.to_string())
    }

    /// Returns the request timeout in seconds. Defaults to 30.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(30)
    }

    /// Returns true if the mock backend was requested.
    pub fn use_mock_backend(&self) -> bool {
        self.use_mock_backend.unwrap_or(false)
    }
}
