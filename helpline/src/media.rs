//! Media platform access tokens.
//!
//! Mints LiveKit-compatible join tokens: an HS256 JWT carrying the
//! participant identity and video grants, signed with the API secret. TTL is
//! one hour, matching the deployment.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{HelplineError, HelplineResult};

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_TTL_HOURS: i64 = 1;

/// Video grants embedded in the token, LiveKit wire naming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrants {
    pub room_join: bool,
    pub room: String,
    pub can_publish: bool,
    pub can_subscribe: bool,
    pub can_publish_data: bool,
}

impl VideoGrants {
    /// Full participant grants for one room.
    pub fn for_room(room: impl Into<String>) -> Self {
        Self {
            room_join: true,
            room: room.into(),
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
        }
    }
}

/// JWT claims for a join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// API key of the issuer.
    pub iss: String,
    /// Participant identity.
    pub sub: String,
    pub name: String,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrants,
}

/// Builder for a join token.
pub struct AccessToken {
    api_key: String,
    api_secret: String,
    identity: String,
    name: String,
    grants: Option<VideoGrants>,
    ttl: Duration,
}

impl AccessToken {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            identity: String::new(),
            name: String::new(),
            grants: None,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_grants(mut self, grants: VideoGrants) -> Self {
        self.grants = Some(grants);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Expiry the minted token will carry.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.ttl
    }

    /// Sign and serialize the token.
    pub fn to_jwt(&self) -> HelplineResult<String> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(HelplineError::Token(
                "media API key/secret not configured".to_string(),
            ));
        }
        let grants = self
            .grants
            .clone()
            .ok_or_else(|| HelplineError::Token("no grants set".to_string()))?;

        let now = Utc::now();
        let claims = TokenClaims {
            iss: self.api_key.clone(),
            sub: self.identity.clone(),
            name: self.name.clone(),
            nbf: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            video: grants,
        };

        let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let signature = sign(&self.api_secret, signing_input.as_bytes())?;
        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }
}

/// Verify a token's signature and expiry, returning its claims.
pub fn validate_token(token: &str, api_secret: &str) -> HelplineResult<TokenClaims> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HelplineError::Token("malformed token".to_string()));
    };

    let signing_input = format!("{}.{}", header, payload);
    let provided = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| HelplineError::Token("malformed signature".to_string()))?;

    // Constant-time compare via the Mac verify API.
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| HelplineError::Token(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    if mac.verify_slice(&provided).is_err() {
        return Err(HelplineError::Token("invalid signature".to_string()));
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| HelplineError::Token("malformed payload".to_string()))?;
    let claims: TokenClaims = serde_json::from_slice(&claims_bytes)?;

    if claims.exp < Utc::now().timestamp() {
        return Err(HelplineError::Token("token expired".to_string()));
    }

    Ok(claims)
}

fn sign(secret: &str, input: &[u8]) -> HelplineResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| HelplineError::Token(e.to_string()))?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}
