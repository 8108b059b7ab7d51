//! HS256 JSON Web Tokens for access and refresh credentials.
//!
//! Both token kinds carry `sub`, `jti`, `token_type`, `iat`, `exp` and
//! `iss`. The `token_type` claim keeps a refresh token from being accepted as
//! an access token and vice versa.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{IssuedRefreshToken, TokenError, TokenIssuer};
use crate::domain::{RefreshClaims, RefreshTokenId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    token_type: TokenType,
    iat: i64,
    exp: i64,
    iss: String,
}

/// How long each token kind stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: TimeDelta,
    pub refresh: TimeDelta,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: TimeDelta::minutes(5),
            refresh: TimeDelta::days(1),
        }
    }
}

/// [`TokenIssuer`] signing with a shared HMAC secret.
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetimes: TokenLifetimes,
}

impl JwtTokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, lifetimes: TokenLifetimes) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            lifetimes,
        }
    }

    fn sign(
        &self,
        user_id: &UserId,
        jti: Uuid,
        token_type: TokenType,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            jti: jti.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok((token, expires_at))
    }

    fn open(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            })?
            .claims;
        if claims.token_type != expected {
            return Err(TokenError::invalid("unexpected token type"));
        }
        Ok(claims)
    }
}

fn parse_uuid(raw: &str, claim: &str) -> Result<Uuid, TokenError> {
    Uuid::parse_str(raw).map_err(|_| TokenError::invalid(format!("malformed {claim} claim")))
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_access(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.sign(user_id, Uuid::new_v4(), TokenType::Access, now, self.lifetimes.access)
            .map(|(token, _)| token)
    }

    fn issue_refresh(
        &self,
        user_id: &UserId,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, TokenError> {
        let (token, expires_at) = self.sign(
            user_id,
            *id.as_uuid(),
            TokenType::Refresh,
            now,
            self.lifetimes.refresh,
        )?;
        Ok(IssuedRefreshToken { token, expires_at })
    }

    fn verify_access(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.open(token, TokenType::Access)?;
        parse_uuid(&claims.sub, "sub").map(UserId::from)
    }

    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = self.open(token, TokenType::Refresh)?;
        Ok(RefreshClaims {
            id: RefreshTokenId::from(parse_uuid(&claims.jti, "jti")?),
            user_id: UserId::from(parse_uuid(&claims.sub, "sub")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[fixture]
    fn issuer() -> JwtTokenIssuer {
        JwtTokenIssuer::new(SECRET, "portfolio-test", TokenLifetimes::default())
    }

    #[rstest]
    fn access_tokens_name_their_subject(issuer: JwtTokenIssuer) {
        let user = UserId::random();
        let token = issuer.issue_access(&user, Utc::now()).expect("signed");
        assert_eq!(issuer.verify_access(&token).expect("valid"), user);
    }

    #[rstest]
    fn refresh_tokens_carry_their_id(issuer: JwtTokenIssuer) {
        let user = UserId::random();
        let id = RefreshTokenId::random();
        let now = Utc::now();
        let issued = issuer.issue_refresh(&user, &id, now).expect("signed");
        assert_eq!(issued.expires_at, now + TimeDelta::days(1));
        let claims = issuer.verify_refresh(&issued.token).expect("valid");
        assert_eq!(claims, RefreshClaims { id, user_id: user });
    }

    #[rstest]
    fn token_kinds_are_not_interchangeable(issuer: JwtTokenIssuer) {
        let user = UserId::random();
        let now = Utc::now();
        let access = issuer.issue_access(&user, now).expect("signed");
        let refresh = issuer
            .issue_refresh(&user, &RefreshTokenId::random(), now)
            .expect("signed");
        assert!(matches!(
            issuer.verify_refresh(&access),
            Err(TokenError::Invalid { .. })
        ));
        assert!(matches!(
            issuer.verify_access(&refresh.token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn expired_tokens_are_reported_as_expired(issuer: JwtTokenIssuer) {
        let issued_at = Utc::now() - TimeDelta::hours(1);
        let token = issuer
            .issue_access(&UserId::random(), issued_at)
            .expect("signed");
        assert_eq!(issuer.verify_access(&token), Err(TokenError::Expired));
    }

    #[rstest]
    fn foreign_signatures_are_rejected(issuer: JwtTokenIssuer) {
        let other = JwtTokenIssuer::new(
            b"another-secret-another-secret-xx",
            "portfolio-test",
            TokenLifetimes::default(),
        );
        let token = other
            .issue_access(&UserId::random(), Utc::now())
            .expect("signed");
        assert!(matches!(
            issuer.verify_access(&token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn other_issuers_are_rejected(issuer: JwtTokenIssuer) {
        let other = JwtTokenIssuer::new(SECRET, "someone-else", TokenLifetimes::default());
        let token = other
            .issue_access(&UserId::random(), Utc::now())
            .expect("signed");
        assert!(issuer.verify_access(&token).is_err());
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    fn garbage_is_invalid(issuer: JwtTokenIssuer, #[case] token: &str) {
        assert!(matches!(
            issuer.verify_access(token),
            Err(TokenError::Invalid { .. })
        ));
    }
}
