use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::Duration;

use super::types::TokenPair;
use crate::config::AuthConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn cookie(name: &str, value: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        name,
        value,
        max_age.num_seconds().max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn append(headers: &mut HeaderMap, cookie: String) {
    // Tokens are base64url and dots, so the value is always a valid header
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.append(SET_COOKIE, value);
    }
}

/// `Set-Cookie` headers carrying both tokens of a new pair
pub fn session_cookies(pair: &TokenPair, config: &AuthConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        cookie(
            ACCESS_TOKEN_COOKIE,
            &pair.access_token,
            config.access_token_ttl,
            config.secure_cookies,
        ),
    );
    append(
        &mut headers,
        cookie(
            REFRESH_TOKEN_COOKIE,
            &pair.refresh_token,
            config.refresh_token_ttl,
            config.secure_cookies,
        ),
    );
    headers
}

/// `Set-Cookie` headers that make the browser drop both tokens
pub fn cleared_session_cookies(config: &AuthConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        append(
            &mut headers,
            cookie(name, "", Duration::zero(), config.secure_cookies),
        );
    }
    headers
}

/// Reads a cookie value from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secure: bool) -> AuthConfig {
        AuthConfig::new("a", Duration::minutes(15), "r", Duration::days(10))
            .unwrap()
            .with_secure_cookies(secure)
    }

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access.jwt.value".to_string(),
            refresh_token: "refresh.jwt.value".to_string(),
        }
    }

    fn set_cookies(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_session_cookies_flags() {
        let cookies = set_cookies(&session_cookies(&pair(), &config(true)));

        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("accessToken=access.jwt.value;"));
        assert!(cookies[0].contains("Max-Age=900"));
        assert!(cookies[1].starts_with("refreshToken=refresh.jwt.value;"));
        assert!(cookies[1].contains("Max-Age=864000"));
        for cookie in &cookies {
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("Secure"));
        }
    }

    #[test]
    fn test_insecure_cookies_for_development() {
        let cookies = set_cookies(&session_cookies(&pair(), &config(false)));
        assert!(cookies.iter().all(|c| !c.contains("Secure")));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        let cookies = set_cookies(&cleared_session_cookies(&config(true)));

        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
        assert!(cookies[0].starts_with("accessToken=;"));
        assert!(cookies[1].starts_with("refreshToken=;"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; refreshToken=abc.def; accessToken="),
        );

        assert_eq!(
            read_cookie(&headers, REFRESH_TOKEN_COOKIE).as_deref(),
            Some("abc.def")
        );
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
