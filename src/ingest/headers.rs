//! Randomized browser-like request headers.
//!
//! Every fetch attempt gets a fresh header set so repeated attempts vary
//! their fingerprint. A user agent is composed from platform and version
//! component pools; when composition yields nothing usable the static
//! fallback pool supplies a complete realistic string.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};

/// Complete, realistic user agents used when dynamic composition fails.
static FALLBACK_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.159 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
];

static PLATFORMS: &[(&str, &str)] = &[
    ("Windows NT 10.0; Win64; x64", "\"Windows\""),
    ("Macintosh; Intel Mac OS X 10_15_7", "\"macOS\""),
    ("X11; Linux x86_64", "\"Linux\""),
];

static CHROME_MAJORS: &[u32] = &[117, 118, 119, 120, 121];

/// Compose a Chrome-like user agent from the component pools.
fn compose_user_agent<R: Rng>(rng: &mut R) -> Option<(String, String, &'static str)> {
    let (platform, ch_platform) = *PLATFORMS.choose(rng)?;
    let major = *CHROME_MAJORS.choose(rng)?;
    let build = rng.gen_range(5000..6500);
    let patch = rng.gen_range(60..220);
    let user_agent = format!(
        "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/{major}.0.{build}.{patch} Safari/537.36"
    );
    let sec_ch_ua = format!(
        "\"Google Chrome\";v=\"{major}\", \"Chromium\";v=\"{major}\", \"Not?A_Brand\";v=\"24\""
    );
    Some((user_agent, sec_ch_ua, ch_platform))
}

/// Build a randomized browser-like header set for one fetch attempt.
pub fn random_headers() -> HeaderMap {
    let mut rng = rand::thread_rng();

    let (user_agent, sec_ch_ua, ch_platform) = compose_user_agent(&mut rng).unwrap_or_else(|| {
        let ua = FALLBACK_USER_AGENTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(FALLBACK_USER_AGENTS[0]);
        (
            ua.to_string(),
            "\"Chromium\";v=\"119\", \"Not?A_Brand\";v=\"24\"".to_string(),
            "\"Windows\"",
        )
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_USER_AGENTS[0])),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    if let Ok(value) = HeaderValue::from_str(&sec_ch_ua) {
        headers.insert(HeaderName::from_static("sec-ch-ua"), value);
    }
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static(ch_platform),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers
}
