//! What a caller presents to unlock a password-protected share.

/// A password, an access token, both, or neither.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Plaintext share password.
    pub password: Option<String>,
    /// Access token previously issued for this share.
    pub token: Option<String>,
}

impl Credentials {
    /// No credentials.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a password.
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            token: None,
        }
    }

    /// Only an access token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            password: None,
            token: Some(token.into()),
        }
    }

    /// Whether nothing was presented.
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.token.is_none()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
