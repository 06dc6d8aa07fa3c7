// region:    --- Imports
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Error

/// 서비스 전역 에러
#[derive(ThisError, Debug)]
pub enum Error {
    /// 대상 엔티티 없음 (Category, Ad, Selection, User)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// 인증 정보 없음 또는 유효하지 않은 토큰
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    /// 잘못된 자격 증명, 만료되었거나 위조된 토큰
    #[error("Token is invalid or expired")]
    InvalidToken,

    /// 인증은 되었으나 권한 없음 (소유자 아님 등)
    #[error("{message}")]
    Forbidden { message: String },

    /// 잘못된 요청 데이터
    #[error("{message}")]
    BadRequest { message: String },

    /// 제약 조건 충돌 (중복 username, 사용 중인 카테고리)
    #[error("{message}")]
    Conflict { message: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// 파일 저장소, 설정 등 인프라 오류
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Error::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthenticated | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Database(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에 노출해도 안전한 메시지
    pub fn user_message(&self) -> String {
        match self {
            Error::Database(_) | Error::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Database(_) | Error::Storage(_) => {
                error!("{:<12} --> 내부 오류: {:#}", "Error", self);
            }
            Error::Unauthenticated | Error::InvalidToken | Error::Forbidden { .. } => {
                info!("{:<12} --> 권한 오류: {}", "Error", self);
            }
            _ => {
                debug!("{:<12} --> 클라이언트 오류: {}", "Error", self);
            }
        }

        (
            self.status_code(),
            Json(json!({ "error": self.user_message() })),
        )
            .into_response()
    }
}

// endregion: --- Error

// region:    --- Extractor Rejections

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

// endregion: --- Extractor Rejections

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        let err = Error::NotFound("Category");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "Category not found");
    }

    #[test]
    fn internal_errors_are_masked() {
        let err = Error::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Internal server error");

        let err = Error::Storage(anyhow::anyhow!("disk full at /var/media"));
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(Error::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::bad_request("no").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::conflict("no").status_code(), StatusCode::CONFLICT);
    }
}
// endregion: --- Tests
