use std::net::IpAddr;
use std::time::Duration;

use pagelens_core::error::AppError;
use pagelens_core::models::RawDocument;
use pagelens_core::traits::Fetcher;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, redirect};
use url::Url;

/// Redirect hops followed before giving up, same as reqwest's default policy.
const MAX_REDIRECTS: usize = 10;

/// Desktop Chrome user agent. Many sites answer naive bot user agents with 403.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP fetcher using reqwest.
///
/// Downloads raw HTML from URLs with a browser User-Agent and a timeout.
/// By default, SSRF protection is **enabled**: requests to private/reserved
/// IP ranges are blocked. Use [`allow_private_urls`](Self::allow_private_urls)
/// to disable this (e.g., for CLI usage where the user controls the machine).
///
/// Redirects are followed by hand so every hop passes the same check.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    ssrf_protection: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            ssrf_protection: true,
        })
    }

    /// Disable SSRF protection, allowing requests to private/reserved IPs.
    ///
    /// Only use this for CLI usage where the user controls the machine.
    pub fn allow_private_urls(mut self) -> Self {
        self.ssrf_protection = false;
        self
    }

    /// GET `url`, following redirects. Each redirect target is checked
    /// against the SSRF guard before it is requested.
    async fn get_following_redirects(&self, url: &str) -> Result<Response, AppError> {
        let mut current = Url::parse(url).map_err(|e| rejected(format!("Invalid URL: {e}")))?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| send_error(&current, e))?;

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(next) = redirect_target(&current, &response)? else {
                return Ok(response);
            };

            tracing::debug!(
                status = response.status().as_u16(),
                "Redirect {} -> {}",
                current,
                next
            );
            if self.ssrf_protection {
                validate_url(next.as_str()).await?;
            }
            current = next;
        }

        Err(rejected(format!("Too many redirects starting at {url}")))
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument, AppError> {
        if self.ssrf_protection {
            validate_url(url).await?;
        }

        let response = self.get_following_redirects(url).await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "GET {}", url);
        if !status.is_success() {
            return Err(AppError::FetchError {
                message: format!("HTTP {} for {}", status.as_u16(), url),
                status_code: Some(status.as_u16()),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| fetch_error(format!("Failed to read response body: {e}")))?;

        Ok(RawDocument {
            html,
            status_code: status.as_u16(),
        })
    }
}

/// Resolve the `Location` of a 3xx response against the URL that produced it.
/// `None` when the response carries no usable `Location`.
fn redirect_target(current: &Url, response: &Response) -> Result<Option<Url>, AppError> {
    let Some(location) = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };
    current
        .join(location)
        .map(Some)
        .map_err(|e| rejected(format!("Invalid redirect target '{location}': {e}")))
}

fn send_error(url: &Url, e: reqwest::Error) -> AppError {
    let message = if e.is_timeout() {
        format!("Request to {url} timed out")
    } else if e.is_connect() {
        format!("Connection failed: {e}")
    } else {
        e.to_string()
    };
    fetch_error(message)
}

fn fetch_error(message: String) -> AppError {
    AppError::FetchError {
        message,
        status_code: None,
    }
}

/// Permanent refusal: retrying the same URL can never succeed.
fn rejected(message: String) -> AppError {
    AppError::FetchRejected(message)
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Validate a URL to prevent server-side request forgery (SSRF).
///
/// 1. Only allow `http` and `https` schemes.
/// 2. Resolve the hostname via DNS.
/// 3. Reject if any resolved IP is private/reserved.
async fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| rejected(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(rejected(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| rejected("URL has no host".to_string()))?;
    // IPv6 literals come back bracketed from host_str
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(ip) {
            return Err(rejected(format!(
                "SSRF blocked: {host} resolves to private/reserved IP"
            )));
        }
        return Ok(());
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| fetch_error(format!("DNS resolution failed for {host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(fetch_error(format!(
            "DNS resolution returned no addresses for {host}"
        )));
    }

    for socket_addr in &addrs {
        if is_private_ip(socket_addr.ip()) {
            return Err(rejected(format!(
                "SSRF blocked: {host} resolves to private/reserved IP {}",
                socket_addr.ip()
            )));
        }
    }

    Ok(())
}

/// Check if an IP address is in a private/reserved/link-local range.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local() // 169.254.0.0/16, cloud metadata
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64 // 100.64.0.0/10 (CGN)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xFFC0) == 0xFE80 // fe80::/10
                || (v6.segments()[0] & 0xFE00) == 0xFC00 // fc00::/7
                || match v6.to_ipv4_mapped() {
                    Some(v4) => is_private_ip(IpAddr::V4(v4)),
                    None => false,
                }
        }
    }
}
