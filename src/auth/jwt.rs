//! JWT access/refresh 토큰 발급과 검증

// region:    --- Imports
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// endregion: --- Imports

// region:    --- Claims

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // 사용자 id
    pub token_type: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

/// 토큰 발급 응답
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

// endregion: --- Claims

// region:    --- Jwt Keys
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenKind::Access)?,
            refresh: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    pub fn issue(&self, user_id: i64, kind: TokenKind) -> Result<String> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            token_type: kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Storage(anyhow::anyhow!("create JWT: {e}")))
    }

    /// 서명, 만료, 토큰 종류를 확인하고 사용자 id 반환
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<i64> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => Error::InvalidToken,
                _ => Error::Storage(anyhow::anyhow!("JWT verification: {e}")),
            },
        )?;

        if data.claims.token_type != expected {
            return Err(Error::InvalidToken);
        }
        Ok(data.claims.sub)
    }
}

// endregion: --- Jwt Keys
