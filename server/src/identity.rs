//! Who a request comes from: its network origin, the session cookie it
//! presents and the name it wants to play under.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use scribble_game::{generate_player_name, MAX_PLAYER_NAME_LENGTH};
use std::{convert::Infallible, net::SocketAddr};

/// Cookie carrying the session credential.
pub const SESSION_COOKIE: &str = "usersession";

/// Cookie carrying a preferred display name.
pub const USERNAME_COOKIE: &str = "username";

/// Origin assigned when nothing identifies the caller.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Whether proxy headers may name the origin of a request. Clients can set
/// these headers freely, so only enable this behind a proxy that overwrites
/// them. Absent from the request extensions means trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrustProxyHeaders(pub bool);

/// Network address a request is attributed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Origin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let trust_proxy_headers = parts
            .extensions
            .get::<TrustProxyHeaders>()
            .map_or(true, |TrustProxyHeaders(trust)| *trust);
        Ok(Origin(request_origin(&parts.headers, peer, trust_proxy_headers)))
    }
}

/// Prefer proxy headers, when trusted, over the peer address of the
/// connection.
pub fn request_origin(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if !trust_proxy_headers {
        return peer_origin(peer);
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').map(str::trim).find(|ip| !ip.is_empty()));
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    peer_origin(peer)
}

fn peer_origin(peer: Option<SocketAddr>) -> String {
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
}

/// Pick a display name: the username cookie, then the submitted field, then
/// a generated one.
pub fn player_name(jar: &CookieJar, submitted: Option<&str>) -> String {
    let from_cookie = jar.get(USERNAME_COOKIE).map(|cookie| cookie.value());
    [from_cookie, submitted]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(|name| name.chars().take(MAX_PLAYER_NAME_LENGTH).collect())
        .unwrap_or_else(generate_player_name)
}

pub fn session(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value())
}

/// Persistent, site-wide, same-site-only session cookie.
pub fn session_cookie(session: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session))
        .path("/")
        .same_site(SameSite::Strict)
        .permanent()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        let peer = "127.0.0.1:4000".parse().ok();
        assert_eq!(request_origin(&headers, peer, true), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        let peer = "127.0.0.1:4000".parse().ok();
        assert_eq!(request_origin(&headers, peer, true), "10.0.0.2");
        assert_eq!(request_origin(&HeaderMap::new(), peer, true), "127.0.0.1");
        assert_eq!(request_origin(&HeaderMap::new(), None, true), UNKNOWN_ORIGIN);
    }

    #[test]
    fn test_untrusted_proxy_headers_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        let peer = "127.0.0.1:4000".parse().ok();
        assert_eq!(request_origin(&headers, peer, false), "127.0.0.1");
        assert_eq!(request_origin(&headers, None, false), UNKNOWN_ORIGIN);
    }

    #[test]
    fn test_player_name_sources() {
        let jar = CookieJar::new();
        assert_eq!(player_name(&jar, Some("  Alice ")), "Alice");

        let jar = jar.add(Cookie::new(USERNAME_COOKIE, "Bob"));
        assert_eq!(player_name(&jar, Some("Alice")), "Bob");

        let jar = CookieJar::new().add(Cookie::new(USERNAME_COOKIE, "   "));
        assert_eq!(player_name(&jar, Some("Alice")), "Alice");

        let long = "x".repeat(64);
        assert_eq!(
            player_name(&CookieJar::new(), Some(&long)).len(),
            MAX_PLAYER_NAME_LENGTH
        );
        assert!(!player_name(&CookieJar::new(), None).is_empty());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert!(cookie.max_age().is_some());
    }
}
