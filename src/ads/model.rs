use serde::{Deserialize, Serialize};

/// 셀렉션 이름 최대 길이
pub const SELECTION_NAME_MAX_CHARS: usize = 20;

// 카테고리 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

// 광고 모델
// image 는 저장소 키이며, 응답에서는 URL 로 변환된다
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ad {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub price: i64,
    pub description: String,
    pub is_published: bool,
    pub category_id: i64,
    pub image: Option<String>,
}

// 작성자 표시 이름이 붙은 광고 (목록/상세 조회 결과)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AdRow {
    #[sqlx(flatten)]
    pub ad: Ad,
    pub author: String,
}

// 셀렉션 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Selection {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    /// 광고 id 집합 (오름차순)
    pub items: Vec<i64>,
}

// region:    --- Payloads

/// 카테고리 생성/수정 요청
#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
}

/// 광고 생성 요청
#[derive(Debug, Deserialize)]
pub struct CreateAdRequest {
    pub name: String,
    pub price: i64,
    pub category_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_published: bool,
    pub author_id: Option<i64>,
}

/// 광고 부분 수정 요청
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAdRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

/// 저장소에 넘기는 신규 광고
#[derive(Debug, Clone)]
pub struct NewAd {
    pub name: String,
    pub author_id: i64,
    pub price: i64,
    pub description: String,
    pub is_published: bool,
    pub category_id: i64,
}

/// 셀렉션 생성 요청
#[derive(Debug, Deserialize)]
pub struct CreateSelectionRequest {
    pub name: String,
    #[serde(default)]
    pub items: Vec<i64>,
}

/// 셀렉션 부분 수정 요청
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSelectionRequest {
    pub name: Option<String>,
    pub items: Option<Vec<i64>>,
}

/// 저장소에 넘기는 신규 셀렉션
#[derive(Debug, Clone)]
pub struct NewSelection {
    pub name: String,
    pub owner_id: i64,
    pub items: Vec<i64>,
}

// endregion: --- Payloads

// region:    --- Validation

pub fn validate_category_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Category name must not be empty".to_string());
    }
    Ok(())
}

pub fn validate_ad_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Ad name must not be empty".to_string());
    }
    Ok(())
}

pub fn validate_price(price: i64) -> Result<(), String> {
    if price < 0 {
        return Err(format!("Price must not be negative, got {price}"));
    }
    Ok(())
}

/// 셀렉션 이름: 1~20자 (바이트가 아닌 문자 수 기준)
pub fn validate_selection_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        return Err("Selection name must not be empty".to_string());
    }
    if len > SELECTION_NAME_MAX_CHARS {
        return Err(format!(
            "Selection name must be at most {SELECTION_NAME_MAX_CHARS} characters, got {len}"
        ));
    }
    Ok(())
}

/// 셀렉션 항목 정규화: 중복 제거 후 오름차순
pub fn normalize_items(mut items: Vec<i64>) -> Vec<i64> {
    items.sort_unstable();
    items.dedup();
    items
}

// endregion: --- Validation
