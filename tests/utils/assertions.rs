//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use super::actions::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: u16) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// Success envelope with matching statusCode
    pub fn is_success(self) -> Self {
        assert_eq!(self.response.body["success"], true);
        assert_eq!(
            self.response.body["statusCode"].as_u64(),
            Some(self.response.status as u64)
        );
        self
    }

    /// Error envelope: success false, null data, non-empty message
    pub fn is_failure(self) -> Self {
        assert_eq!(self.response.body["success"], false);
        assert!(self.response.body["data"].is_null());
        assert!(!self.response.body["message"]
            .as_str()
            .unwrap_or_default()
            .is_empty());
        self
    }

    /// Both session cookies are set, http-only, with a non-empty value
    pub fn sets_session_cookies(self) -> Self {
        for name in ["accessToken=", "refreshToken="] {
            let cookie = self
                .response
                .set_cookies
                .iter()
                .find(|c| c.starts_with(name))
                .unwrap_or_else(|| panic!("missing {} cookie", name));
            assert!(cookie.contains("HttpOnly"));
            assert!(!cookie.starts_with(&format!("{};", name)));
        }
        self
    }

    /// Both session cookies are expired
    pub fn clears_session_cookies(self) -> Self {
        assert_eq!(self.response.set_cookies.len(), 2);
        assert!(self
            .response
            .set_cookies
            .iter()
            .all(|c| c.contains("Max-Age=0")));
        self
    }

    pub fn sets_no_cookies(self) -> Self {
        assert!(self.response.set_cookies.is_empty());
        self
    }

    pub fn never_exposes_secrets(self) -> Self {
        let rendered = self.response.body.to_string();
        assert!(!rendered.contains("passwordHash"));
        assert!(!rendered.contains("password_hash"));
        assert!(!rendered.contains("$argon2"));
        self
    }
}
