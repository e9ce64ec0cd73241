//! Share access token creation and validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::warn;
use uuid::Uuid;

use dropshare_core::config::auth::AuthConfig;
use dropshare_core::error::AppError;
use dropshare_core::ShareId;

use super::claims::{SHARE_READ_SCOPE, ShareAccessClaims};

/// A freshly issued token together with its expiry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccessToken {
    /// Compact JWS string.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 share access tokens.
#[derive(Clone)]
pub struct ShareTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for ShareTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareTokenIssuer")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ShareTokenIssuer {
    /// Creates an issuer from auth configuration.
    ///
    /// Without a configured secret a random one is generated, so tokens are
    /// invalidated by a restart.
    pub fn new(config: &AuthConfig) -> Self {
        let secret = match config.token_secret.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("auth.token_secret is not set; using a random per-process secret");
                rand::random::<[u8; 32]>().to_vec()
            }
        };
        Self::from_secret(&secret, Duration::minutes(config.access_token_ttl_minutes.max(1)))
    }

    /// Creates an issuer from a raw secret and token lifetime.
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issues a token for `share_id` that never outlives the share itself.
    pub fn issue(
        &self,
        share_id: &ShareId,
        share_expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AppError> {
        let now = Utc::now();
        let expires_at = (now + self.ttl).min(share_expires_at);

        let claims = ShareAccessClaims {
            sub: share_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            scope: SHARE_READ_SCOPE.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(AccessToken { token, expires_at })
    }

    /// Validates a token and checks that it was issued for `share_id`.
    pub fn verify(&self, token: &str, share_id: &ShareId) -> Result<ShareAccessClaims, AppError> {
        let data = decode::<ShareAccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Access token has expired")
                }
                _ => AppError::unauthorized("Invalid access token"),
            })?;

        let claims = data.claims;
        if claims.sub != share_id.as_str() || claims.scope != SHARE_READ_SCOPE {
            return Err(AppError::unauthorized("Invalid access token"));
        }
        Ok(claims)
    }
}
