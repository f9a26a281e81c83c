//! Access token claims

use serde::{Deserialize, Serialize};

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}
