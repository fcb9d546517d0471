//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the account id and role. Verification pins
//! the algorithm and issuer, so a token signed any other way is invalid even
//! when its payload looks right.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::JwtConfig;
use domain::{Role, DEFAULT_TOKEN_ISSUER, DEFAULT_TOKEN_LIFETIME_HOURS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Verified caller identity, installed into the request context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

/// A freshly signed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("token signing secret is required")]
    MissingSecret,
}

/// Issues and verifies session tokens.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for the account, valid from now for the configured lifetime.
    fn issue(&self, user_id: i64, role: Role) -> Result<IssuedToken, TokenError>;

    /// Check signature, algorithm, issuer and expiry, and decode the identity.
    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}

/// Token service settings
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub lifetime: Duration,
    pub issuer: String,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl From<&JwtConfig> for TokenConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            lifetime: Duration::hours(config.expiration_hours),
            issuer: config.issuer.clone(),
        }
    }
}

/// HS256 token service with a shared secret.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    issuer: String,
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("lifetime", &self.lifetime)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Build the service. An empty secret is rejected; a non-positive
    /// lifetime or empty issuer fall back to the defaults.
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let lifetime = if config.lifetime > Duration::zero() {
            config.lifetime
        } else {
            Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS)
        };

        let issuer = if config.issuer.trim().is_empty() {
            DEFAULT_TOKEN_ISSUER.to_string()
        } else {
            config.issuer
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        // Expiry is checked after decoding so that exp <= iat reads as invalid, not expired
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime,
            issuer,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_id: i64,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.lifetime;

        let claims = Claims {
            user_id,
            role: role.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at,
        })
    }

    /// Verify a token against the given current time.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        let claims = data.claims;

        if claims.exp <= claims.iat {
            return Err(TokenError::Invalid);
        }
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let role = claims.role.parse::<Role>().map_err(|_| TokenError::Invalid)?;

        Ok(Identity {
            user_id: claims.user_id,
            role,
        })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: i64, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-123";

    fn config() -> TokenConfig {
        TokenConfig {
            secret: SECRET.to_string(),
            lifetime: Duration::hours(24),
            issuer: "account-backend".to_string(),
        }
    }

    fn service() -> JwtTokenService {
        JwtTokenService::new(config()).unwrap()
    }

    fn sign_raw<T: Serialize>(claims: &T, alg: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn raw_claims(role: &str, iat: i64, exp: i64) -> Claims {
        Claims {
            user_id: 7,
            role: role.to_string(),
            iss: "account-backend".to_string(),
            iat,
            exp,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let svc = service();
        let issued = svc.issue(42, Role::Viewer).unwrap();

        assert_eq!(issued.expires_in(), 24 * 3600);
        assert_eq!(
            svc.verify(&issued.token).unwrap(),
            Identity {
                user_id: 42,
                role: Role::Viewer
            }
        );
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let result = JwtTokenService::new(TokenConfig {
            secret: String::new(),
            ..config()
        });
        assert_eq!(result.unwrap_err(), TokenError::MissingSecret);
    }

    #[test]
    fn test_non_positive_lifetime_defaults_to_24h() {
        for lifetime in [Duration::zero(), Duration::hours(-3)] {
            let svc = JwtTokenService::new(TokenConfig {
                lifetime,
                ..config()
            })
            .unwrap();
            assert_eq!(svc.lifetime(), Duration::hours(24));
        }
    }

    #[test]
    fn test_empty_issuer_defaults() {
        let svc = JwtTokenService::new(TokenConfig {
            issuer: String::new(),
            ..config()
        })
        .unwrap();
        assert_eq!(svc.issuer(), "account-backend");
    }

    #[test]
    fn test_expired_token_is_expired_not_invalid() {
        let svc = service();
        let issued = svc
            .issue_at(1, Role::User, Utc::now() - Duration::hours(25))
            .unwrap();

        assert_eq!(svc.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_valid_until_expiry() {
        let svc = service();
        let now = Utc::now();
        let issued = svc.issue_at(1, Role::User, now).unwrap();

        assert!(svc
            .verify_at(&issued.token, now + Duration::hours(23))
            .is_ok());
        assert_eq!(
            svc.verify_at(&issued.token, now + Duration::hours(24)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_other_secret_is_invalid() {
        let other = JwtTokenService::new(TokenConfig {
            secret: "a-completely-different-secret-value!!".to_string(),
            ..config()
        })
        .unwrap();
        let token = other.issue(1, Role::Admin).unwrap().token;

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let other = JwtTokenService::new(TokenConfig {
            issuer: "someone-else".to_string(),
            ..config()
        })
        .unwrap();
        let token = other.issue(1, Role::Admin).unwrap().token;

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let svc = service();
        for token in ["", "abc", "a.b.c", "not.a.jwt.at.all"] {
            assert_eq!(svc.verify(token), Err(TokenError::Invalid), "{:?}", token);
        }
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let svc = service();
        let token = svc.issue(1, Role::Viewer).unwrap().token;
        let forged = sign_raw(
            &raw_claims("admin", Utc::now().timestamp(), Utc::now().timestamp() + 60),
            Algorithm::HS256,
            "attacker-secret",
        );
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(svc.verify(&spliced), Err(TokenError::Invalid));
    }

    #[test]
    fn test_other_algorithm_is_invalid_even_with_right_secret() {
        let now = Utc::now().timestamp();
        let token = sign_raw(&raw_claims("admin", now, now + 3600), Algorithm::HS512, SECRET);

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_unknown_role_is_invalid() {
        let now = Utc::now().timestamp();
        let token = sign_raw(&raw_claims("superuser", now, now + 3600), Algorithm::HS256, SECRET);

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_exp_not_after_iat_is_invalid() {
        let now = Utc::now().timestamp();
        let token = sign_raw(&raw_claims("user", now + 7200, now + 3600), Algorithm::HS256, SECRET);

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_missing_issuer_claim_is_invalid() {
        #[derive(Serialize)]
        struct NoIssuer {
            user_id: i64,
            role: String,
            iat: i64,
            exp: i64,
        }
        let now = Utc::now().timestamp();
        let token = sign_raw(
            &NoIssuer {
                user_id: 1,
                role: "user".to_string(),
                iat: now,
                exp: now + 3600,
            },
            Algorithm::HS256,
            SECRET,
        );

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }
}
