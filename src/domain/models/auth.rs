use serde::{Deserialize, Serialize};
use super::user::UserProfile;

/// Bearer token payload. Only the identity reference is trusted; role and
/// contact data are re-read from storage on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}
