use crate::client::{ApiError, ApiResult};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

/// Refresh once the token has this many seconds or fewer left.
pub const REFRESH_WINDOW_SECS: i64 = 60;

/// How often the watchdog compares the clock against the expiry.
pub const WATCH_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    pub sub: i64,
    #[serde(rename = "userName", default)]
    pub user_name: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Read the claims out of a JWT without verifying the signature. The backend
/// verifies; the client only needs the subject and the expiry. Expiry is
/// checked by [`watch_action`], not here, so an expired token still decodes.
pub fn decode_claims(token: &str) -> ApiResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ApiError::Auth(format!("invalid access token: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub person_id: i64,
    pub user_name: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl Session {
    pub fn from_token(access_token: String) -> ApiResult<Self> {
        let claims = decode_claims(&access_token)?;
        Ok(Self {
            access_token,
            person_id: claims.sub,
            user_name: claims.user_name,
            expires_at: claims.exp,
        })
    }

    /// Swap in a refreshed token, keeping the identity.
    pub fn renew(&mut self, access_token: String) -> ApiResult<()> {
        let claims = decode_claims(&access_token)?;
        self.expires_at = claims.exp;
        self.access_token = access_token;
        Ok(())
    }

    pub fn seconds_to_expiry(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session.
    #[default]
    Idle,
    /// Logged in, watchdog running.
    Scheduled,
    /// A refresh request is in flight.
    Refreshing,
    /// The token ran out before it could be refreshed.
    Expired,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "signed out",
            SessionState::Scheduled => "signed in",
            SessionState::Refreshing => "refreshing",
            SessionState::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Wait,
    Refresh,
    Expire,
}

pub fn watch_action(expires_at: i64, now: i64) -> WatchAction {
    let remaining = expires_at - now;
    if remaining <= 0 {
        WatchAction::Expire
    } else if remaining <= REFRESH_WINDOW_SECS {
        WatchAction::Refresh
    } else {
        WatchAction::Wait
    }
}
