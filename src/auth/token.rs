use crate::errors::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id of the holder
    pub sub: String,
    /// Holder display name at issue time
    pub name: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

impl Claims {
    /// Parses the subject back into an account id.
    pub fn account_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| Error::Unauthorized {
            message: "Invalid user ID in token claims".to_string(),
        })
    }
}

/// Issues and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Builds an issuer from the raw secret and token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issues a token identifying `account_id`, valid for the configured lifetime.
    pub fn issue(&self, account_id: Uuid, holder: &str) -> Result<String> {
        let claims = Claims {
            sub: account_id.to_string(),
            name: holder.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            Error::Storage {
                message: format!("Failed to sign token: {e}"),
            }
        })
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized {
                message: format!("Could not verify token: {e}"),
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() -> Result<()> {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(1));
        let id = Uuid::new_v4();

        let token = issuer.issue(id, "alice")?;
        let claims = issuer.verify(&token)?;

        assert_eq!(claims.account_id()?, id);
        assert_eq!(claims.name, "alice");
        assert!(claims.exp > Utc::now().timestamp());
        Ok(())
    }

    #[test]
    fn test_wrong_secret_rejected() -> Result<()> {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(1));
        let other = TokenIssuer::new(b"other-secret", Duration::hours(1));

        let token = issuer.issue(Uuid::new_v4(), "alice")?;
        let result = other.verify(&token);
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[test]
    fn test_expired_token_rejected() -> Result<()> {
        // Well past the default 60s validation leeway
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(-2));
        let token = issuer.issue(Uuid::new_v4(), "alice")?;
        assert!(matches!(
            issuer.verify(&token),
            Err(Error::Unauthorized { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", Duration::hours(1));
        assert!(issuer.verify("not.a.token").is_err());
    }
}
