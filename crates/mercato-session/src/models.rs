//! Request and response shapes for the session flows.

use serde::{Deserialize, Serialize};

/// Login request. The password travels transport-encoded, never as the
/// literal plaintext.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    /// Transport-encoded password (see `mercato_auth::CredentialCodec`).
    pub password: String,
}

/// Refresh request carrying the opaque refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful login or refresh response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    pub refresh_token: String,
}

impl TokenResponse {
    #[must_use]
    pub fn bearer(access_token: String, expires_in: i64, refresh_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_wire_shape() {
        let response = TokenResponse::bearer("at".into(), 3600, "rt".into());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["access_token"], "at");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["refresh_token"], "rt");
    }

    #[test]
    fn login_request_deserializes() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"d2lyZQ"}"#).unwrap();
        assert_eq!(request.username, "alice");
        assert_eq!(request.password, "d2lyZQ");
    }
}
