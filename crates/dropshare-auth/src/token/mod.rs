//! Signed share access tokens.

pub mod claims;
pub mod issuer;

pub use claims::ShareAccessClaims;
pub use issuer::{AccessToken, ShareTokenIssuer};
