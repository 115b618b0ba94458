//! Rate limiting middleware using governor and `tower_governor`.
//!
//! The storefront only throttles the authentication endpoints
//! (~10 requests per minute per IP) to slow down credential stuffing.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers that may carry the real client IP, in trust order.
///
/// Cloudflare sits in front of the app, so its header wins; the rest
/// cover direct Fly.io traffic and local reverse proxies.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Key extractor that resolves the real client IP behind proxies.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| header_ip(req.headers(), name))
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Parse an IP from a proxy header. `X-Forwarded-For` may carry a
/// comma-separated chain; the first entry is the client.
fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// This prevents brute force attacks on login/registration endpoints.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request_with_header(name: &'static str, value: &'static str) -> Request<()> {
        Request::builder()
            .header(name, value)
            .body(())
            .expect("request builds")
    }

    #[test]
    fn prefers_cloudflare_header() {
        let req = Request::builder()
            .header("cf-connecting-ip", "203.0.113.7")
            .header("x-forwarded-for", "198.51.100.1")
            .body(())
            .expect("request builds");

        let key = ClientIpKeyExtractor.extract(&req).expect("extracts");
        assert_eq!(key, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn takes_first_forwarded_ip() {
        let req = request_with_header("x-forwarded-for", "198.51.100.1, 10.0.0.1");
        let key = ClientIpKeyExtractor.extract(&req).expect("extracts");
        assert_eq!(key, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn no_headers_is_an_error() {
        let req = Request::builder().body(()).expect("request builds");
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
