//! 토큰 인증
//!
//! `Authorization: Token <key>` 또는 `Bearer <key|jwt>` 헤더로 사용자를 식별한다.
//! 인증이 선택인 핸들러는 `Option<CurrentUser>` 를 받는다.

pub mod jwt;

// region:    --- Imports
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::app::AppState;
use crate::error::{Error, Result};
use crate::users::model::{User, UserRole};
use jwt::TokenKind;

// endregion: --- Imports

// region:    --- Current User

/// 인증된 요청 사용자
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }

    /// 관리자가 아니면 403
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden(
                "You do not have permission to perform this action.",
            ))
        }
    }

    /// 자원 소유자가 아니면 403
    pub fn require_owner(&self, owner_id: i64) -> Result<()> {
        if self.id() == owner_id {
            Ok(())
        } else {
            Err(Error::forbidden("You are not the owner of this resource."))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthenticated)?;
        let credentials = parse_credentials(header).ok_or(Error::Unauthenticated)?;

        let user = match credentials {
            Credentials::Key(key) => state.store.user_for_token(key).await?,
            Credentials::Jwt(token) => {
                let user_id = state.jwt.verify(token, TokenKind::Access)?;
                state.store.get_user(user_id).await?
            }
        };
        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                debug!("{:<12} --> 알 수 없는 토큰", "Auth");
                Err(Error::InvalidToken)
            }
        }
    }
}

// endregion: --- Current User

/// Authorization 헤더의 자격 증명
#[derive(Debug, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// 로그인으로 발급한 저장소 토큰
    Key(&'a str),
    /// JWT access 토큰 (header.payload.signature)
    Jwt(&'a str),
}

/// `Token <key>` 는 저장소 토큰, `Bearer` 는 점 두 개로 이뤄진 JWT 면 JWT
pub fn parse_credentials(header: &str) -> Option<Credentials<'_>> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("token") {
        Some(Credentials::Key(token))
    } else if scheme.eq_ignore_ascii_case("bearer") {
        if token.matches('.').count() == 2 {
            Some(Credentials::Jwt(token))
        } else {
            Some(Credentials::Key(token))
        }
    } else {
        None
    }
}
