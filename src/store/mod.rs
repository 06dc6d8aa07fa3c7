//! 영속성 계층
//!
//! 핸들러는 `Store` 트레이트만 알고, 실제 구현은 Postgres(`postgres`) 또는
//! 프로세스 메모리(`in_memory`) 중 하나를 주입받는다.

// region:    --- Imports
use async_trait::async_trait;

use crate::ads::model::{AdRow, Category, NewAd, NewSelection, Selection, UpdateAdRequest};
use crate::error::Result;
use crate::query::filter::AdFilter;
use crate::query::pager::Window;
use crate::users::model::{NewUser, User, UserChanges};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PgStore;

// endregion: --- Imports

// region:    --- Store Trait
#[async_trait]
pub trait Store: Send + Sync {
    // 카테고리
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;
    async fn create_category(&self, name: &str) -> Result<Category>;
    async fn update_category(&self, id: i64, name: &str) -> Result<Option<Category>>;
    /// 광고가 참조 중이면 `Conflict`. 없으면 false
    async fn delete_category(&self, id: i64) -> Result<bool>;

    // 광고
    /// 조건에 맞는 광고 중 범위만큼과 전체 개수 (가격 내림차순)
    async fn search_ads(&self, filter: &AdFilter, window: Window) -> Result<(Vec<AdRow>, usize)>;
    async fn get_ad(&self, id: i64) -> Result<Option<AdRow>>;
    /// 존재하는 광고만 id 오름차순으로 반환
    async fn ads_by_ids(&self, ids: &[i64]) -> Result<Vec<AdRow>>;
    async fn create_ad(&self, ad: NewAd) -> Result<AdRow>;
    async fn update_ad(&self, id: i64, changes: &UpdateAdRequest) -> Result<Option<AdRow>>;
    /// 이미지 키 교체. 광고가 없으면 None, 있으면 이전 키
    async fn set_ad_image(&self, id: i64, image: Option<String>) -> Result<Option<Option<String>>>;
    async fn delete_ad(&self, id: i64) -> Result<bool>;

    // 셀렉션
    async fn list_selections(&self) -> Result<Vec<Selection>>;
    async fn get_selection(&self, id: i64) -> Result<Option<Selection>>;
    async fn create_selection(&self, selection: NewSelection) -> Result<Selection>;
    /// items 가 있으면 항목 집합 전체를 교체
    async fn update_selection(
        &self,
        id: i64,
        name: Option<String>,
        items: Option<Vec<i64>>,
    ) -> Result<Option<Selection>>;
    async fn delete_selection(&self, id: i64) -> Result<bool>;

    // 사용자
    async fn list_users(&self, window: Window) -> Result<(Vec<User>, usize)>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// username 중복이면 `Conflict`
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;
    /// 사용자의 광고, 셀렉션, 토큰도 함께 삭제.
    /// 없으면 None, 있으면 삭제된 광고들의 이미지 키
    async fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>>;

    // 토큰
    /// 사용자 토큰 발급. 이미 있으면 같은 토큰
    async fn issue_token(&self, user_id: i64) -> Result<String>;
    async fn user_for_token(&self, token: &str) -> Result<Option<User>>;
}
// endregion: --- Store Trait

/// 새 인증 토큰 값
pub(crate) fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 작성자 표시 이름: first_name 이 비어 있으면 username
pub(crate) fn display_name(user: &User) -> String {
    if user.first_name.is_empty() {
        user.username.clone()
    } else {
        user.first_name.clone()
    }
}
