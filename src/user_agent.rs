//! Static request headers sent with every archive request.
//!
//! File archives behind CDNs tend to reject unknown agents, so requests carry a
//! desktop browser User-Agent and Accept header.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

/// Browser User-Agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Accept header matching [`BROWSER_USER_AGENT`].
pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Header set installed as client defaults.
#[must_use]
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers
}
