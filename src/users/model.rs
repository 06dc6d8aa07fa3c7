use serde::{Deserialize, Serialize};

// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Moderator,
    Admin,
}

// 사용자 모델
// locations, total_ads 는 조회 시 계산되는 값
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub locations: Vec<String>,
    /// 게시된 광고 수
    pub total_ads: i64,
}

// region:    --- Payloads

/// 회원 가입 요청
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// 사용자 부분 수정 요청
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub locations: Option<Vec<String>>,
}

/// 로그인 요청
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// JWT 갱신 요청
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// 저장소에 넘기는 신규 사용자 (비밀번호는 해시 상태)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub locations: Vec<String>,
}

/// 저장소에 넘기는 사용자 변경분
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub locations: Option<Vec<String>>,
}

// endregion: --- Payloads

/// 지역 이름 정규화: 공백 제거, 빈 값/중복 제거
pub fn normalize_locations(locations: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(locations.len());
    for name in locations {
        let name = name.trim().to_string();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
