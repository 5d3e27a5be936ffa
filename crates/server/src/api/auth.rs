//! HTTP Basic Authentication for the dashboard routes.
//!
//! A single admin credential pair: the username is fixed
//! ([`config::ADMIN_USERNAME`]), the password comes from configuration.
//! Both comparisons are constant-time. When no password is configured the
//! gate is disabled entirely (dev mode).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use seamaster_core::config;
use subtle::ConstantTimeEq;

/// Credentials checked by the Basic-Auth middleware.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    password: String,
}

impl AdminCredentials {
    pub fn new(password: String) -> Self {
        Self { password }
    }

    /// Check an `Authorization` header value against the admin pair.
    ///
    /// Accepts only `Basic <base64(user:pass)>`; any parse failure counts as
    /// a failed check rather than an error.
    pub fn verify_header(&self, header: Option<&str>) -> bool {
        let Some(encoded) = header.and_then(|h| h.strip_prefix("Basic ")) else {
            return false;
        };
        let Ok(decoded) = BASE64.decode(encoded.trim()) else {
            return false;
        };
        let Ok(pair) = String::from_utf8(decoded) else {
            return false;
        };
        let Some((user, password)) = pair.split_once(':') else {
            return false;
        };

        let user_ok: bool = user
            .as_bytes()
            .ct_eq(config::ADMIN_USERNAME.as_bytes())
            .into();
        let pass_ok: bool = password.as_bytes().ct_eq(self.password.as_bytes()).into();
        user_ok & pass_ok
    }
}
