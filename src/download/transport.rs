use rand::seq::SliceRandom;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use crate::error::{DownloadError, Result};

const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Address family the connector binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    #[default]
    Any,
    V4,
    V6,
}

impl IpFamily {
    fn local_address(self) -> Option<IpAddr> {
        match self {
            IpFamily::Any => None,
            IpFamily::V4 => Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            IpFamily::V6 => Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
        }
    }
}

/// Connection settings applied to the HTTP session of each transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub ip_family: IpFamily,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Without a read timeout a stalled server blocks the transfer until it is cancelled.
    #[serde(default)]
    pub read_timeout_secs: Option<u64>,
}

fn default_max_redirects() -> usize {
    10
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            ip_family: IpFamily::Any,
            max_redirects: default_max_redirects(),
            connect_timeout_secs: None,
            read_timeout_secs: None,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("aiodl/{}", env!("CARGO_PKG_VERSION"))
}

/// Pick one of the bundled desktop browser user agents.
pub fn random_browser_user_agent() -> &'static str {
    BROWSER_USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_USER_AGENTS[0])
}

/// Default headers for a session: caller headers first, then a user agent
/// unless the caller already supplied one.
pub fn build_headers(custom: &HashMap<String, String>, fake_user_agent: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in custom {
        let header_name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| DownloadError::InvalidHeader { name: name.clone() })?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|_| DownloadError::InvalidHeader { name: name.clone() })?;
        headers.insert(header_name, header_value);
    }

    if !headers.contains_key(USER_AGENT) {
        let agent = if fake_user_agent {
            random_browser_user_agent().to_string()
        } else {
            default_user_agent()
        };
        let value = HeaderValue::from_str(&agent).map_err(|_| DownloadError::InvalidHeader {
            name: USER_AGENT.to_string(),
        })?;
        headers.insert(USER_AGENT, value);
    }

    Ok(headers)
}

/// Build the HTTP session owned by a single transfer.
pub fn build_client(
    config: &TransportConfig,
    custom_headers: &HashMap<String, String>,
    fake_user_agent: bool,
) -> Result<Client> {
    let headers = build_headers(custom_headers, fake_user_agent)?;

    let mut builder = Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .local_address(config.ip_family.local_address());

    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.read_timeout_secs {
        builder = builder.read_timeout(Duration::from_secs(secs));
    }

    builder.build().map_err(DownloadError::Client)
}
