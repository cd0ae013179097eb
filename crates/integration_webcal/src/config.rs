//! Webcal client configuration

use serde::{Deserialize, Serialize};

/// Feed download settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebcalConfig {
    /// Overall request deadline in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect deadline in seconds (default: 10)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Largest accepted feed body in bytes (default: 10 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Redirect hops followed before giving up (default: 5)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

const fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    format!("calsync/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for WebcalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_body_bytes: default_max_body_bytes(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}
