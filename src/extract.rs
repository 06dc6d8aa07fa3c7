//! 요청 추출기
//!
//! axum 기본 추출기의 거부 응답(평문)을 `Error` 로 바꿔
//! 모든 오류 본문을 `{"error": ...}` 로 맞춘다.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// JSON 요청 본문
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Payload<T>(pub T);

/// 경로 파라미터
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);
