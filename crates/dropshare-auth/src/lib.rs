//! # dropshare-auth
//!
//! Password protection for shares: Argon2id hashing of share passwords and
//! short-lived signed access tokens handed out after a successful password
//! check, so that clients do not have to resend the password on every
//! request.

pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{AccessToken, ShareAccessClaims, ShareTokenIssuer};
