// region:    --- Imports
use async_trait::async_trait;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::info;

use super::{generate_token, Store};
use crate::ads::model::{
    normalize_items, AdRow, Category, NewAd, NewSelection, Selection, UpdateAdRequest,
};
use crate::database::DatabaseManager;
use crate::error::{Error, Result};
use crate::query::filter::AdFilter;
use crate::query::pager::Window;
use crate::query::queries;
use crate::users::model::{normalize_locations, NewUser, User, UserChanges};

// endregion: --- Imports

// region:    --- Postgres Store
pub struct PgStore {
    db_manager: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

/// 광고 한 건 조회 (작성자 이름 포함)
async fn fetch_ad_row(conn: &mut PgConnection, id: i64) -> Result<Option<AdRow>> {
    let mut query = QueryBuilder::<Postgres>::new(queries::SELECT_AD_ROWS);
    query.push(" AND a.id = ");
    query.push_bind(id);
    Ok(query.build_query_as::<AdRow>().fetch_optional(conn).await?)
}

/// 사용자 한 건 조회 (지역, 게시 광고 수 포함)
async fn fetch_user(conn: &mut PgConnection, id: i64) -> Result<Option<User>> {
    let sql = format!("{} WHERE u.id = $1", queries::SELECT_USERS);
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?)
}

/// 셀렉션 한 건 조회 (항목 포함)
async fn fetch_selection(conn: &mut PgConnection, id: i64) -> Result<Option<Selection>> {
    let sql = format!("{} WHERE s.id = $1", queries::SELECT_SELECTIONS);
    Ok(sqlx::query_as::<_, Selection>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?)
}

/// 사용자 지역 연결을 주어진 목록으로 교체
async fn replace_locations(conn: &mut PgConnection, user_id: i64, locations: Vec<String>) -> Result<()> {
    sqlx::query(queries::CLEAR_USER_LOCATIONS)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    let locations = normalize_locations(locations);
    if locations.is_empty() {
        return Ok(());
    }
    let location_ids: Vec<i64> = sqlx::query_scalar(queries::UPSERT_LOCATIONS)
        .bind(locations)
        .fetch_all(&mut *conn)
        .await?;
    sqlx::query(queries::INSERT_USER_LOCATIONS)
        .bind(user_id)
        .bind(location_ids)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// 고유 제약 위반 여부
fn is_unique_violation(err: &Error) -> bool {
    match err {
        Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        info!("{:<12} --> 카테고리 목록 조회", "Query");
        Ok(sqlx::query_as::<_, Category>(queries::LIST_CATEGORIES)
            .fetch_all(self.db_manager.pool())
            .await?)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        info!("{:<12} --> 카테고리 조회 id: {}", "Query", id);
        Ok(sqlx::query_as::<_, Category>(queries::GET_CATEGORY)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?)
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        info!("{:<12} --> 카테고리 생성: {}", "Command", name);
        Ok(sqlx::query_as::<_, Category>(queries::INSERT_CATEGORY)
            .bind(name)
            .fetch_one(self.db_manager.pool())
            .await?)
    }

    async fn update_category(&self, id: i64, name: &str) -> Result<Option<Category>> {
        info!("{:<12} --> 카테고리 수정 id: {}", "Command", id);
        Ok(sqlx::query_as::<_, Category>(queries::UPDATE_CATEGORY)
            .bind(name)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?)
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        info!("{:<12} --> 카테고리 삭제 id: {}", "Command", id);
        match sqlx::query(queries::DELETE_CATEGORY)
            .bind(id)
            .execute(self.db_manager.pool())
            .await
        {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(Error::conflict("Category is in use"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn search_ads(&self, filter: &AdFilter, window: Window) -> Result<(Vec<AdRow>, usize)> {
        info!("{:<12} --> 광고 검색: {:?}", "Query", filter);
        let filter = filter.clone();
        // 개수와 목록이 같은 스냅샷을 보도록 한 트랜잭션에서 조회
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query(queries::SET_REPEATABLE_READ)
                        .execute(&mut **tx)
                        .await?;

                    let mut count_query = QueryBuilder::<Postgres>::new(queries::COUNT_AD_ROWS);
                    filter.push_conditions(&mut count_query);
                    let total: i64 = count_query
                        .build_query_scalar()
                        .fetch_one(&mut **tx)
                        .await?;

                    let mut query = QueryBuilder::<Postgres>::new(queries::SELECT_AD_ROWS);
                    filter.push_conditions(&mut query);
                    query.push(queries::ORDER_ADS_BY_PRICE);
                    query.push(" LIMIT ");
                    query.push_bind(window.limit_i64());
                    query.push(" OFFSET ");
                    query.push_bind(window.offset_i64());
                    let rows = query
                        .build_query_as::<AdRow>()
                        .fetch_all(&mut **tx)
                        .await?;

                    Ok::<_, Error>((rows, usize::try_from(total).unwrap_or_default()))
                })
            })
            .await
    }

    async fn get_ad(&self, id: i64) -> Result<Option<AdRow>> {
        info!("{:<12} --> 광고 조회 id: {}", "Query", id);
        let mut conn = self.db_manager.pool().acquire().await?;
        fetch_ad_row(&mut conn, id).await
    }

    async fn ads_by_ids(&self, ids: &[i64]) -> Result<Vec<AdRow>> {
        let ids = normalize_items(ids.to_vec());
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<Postgres>::new(queries::SELECT_AD_ROWS);
        query.push(" AND a.id = ANY(");
        query.push_bind(ids);
        query.push(") ORDER BY a.id");
        Ok(query
            .build_query_as::<AdRow>()
            .fetch_all(self.db_manager.pool())
            .await?)
    }

    async fn create_ad(&self, ad: NewAd) -> Result<AdRow> {
        info!("{:<12} --> 광고 생성: {:?}", "Command", ad);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let id: i64 = sqlx::query_scalar(queries::INSERT_AD)
                        .bind(&ad.name)
                        .bind(ad.author_id)
                        .bind(ad.price)
                        .bind(&ad.description)
                        .bind(ad.is_published)
                        .bind(ad.category_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    fetch_ad_row(&mut **tx, id)
                        .await?
                        .ok_or(Error::NotFound("Ad"))
                })
            })
            .await
    }

    async fn update_ad(&self, id: i64, changes: &UpdateAdRequest) -> Result<Option<AdRow>> {
        info!("{:<12} --> 광고 수정 id: {}", "Command", id);
        let name = changes.name.clone();
        let price = changes.price;
        let description = changes.description.clone();
        let is_published = changes.is_published;
        let category_id = changes.category_id;
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let updated: Option<i64> = sqlx::query_scalar(queries::UPDATE_AD)
                        .bind(name)
                        .bind(price)
                        .bind(description)
                        .bind(is_published)
                        .bind(category_id)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    match updated {
                        Some(id) => fetch_ad_row(&mut **tx, id).await,
                        None => Ok(None),
                    }
                })
            })
            .await
    }

    async fn set_ad_image(&self, id: i64, image: Option<String>) -> Result<Option<Option<String>>> {
        info!("{:<12} --> 광고 이미지 교체 id: {}", "Command", id);
        Ok(sqlx::query_scalar::<_, Option<String>>(queries::SET_AD_IMAGE)
            .bind(image)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?)
    }

    async fn delete_ad(&self, id: i64) -> Result<bool> {
        info!("{:<12} --> 광고 삭제 id: {}", "Command", id);
        let result = sqlx::query(queries::DELETE_AD)
            .bind(id)
            .execute(self.db_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_selections(&self) -> Result<Vec<Selection>> {
        info!("{:<12} --> 셀렉션 목록 조회", "Query");
        let sql = format!("{} ORDER BY s.id", queries::SELECT_SELECTIONS);
        Ok(sqlx::query_as::<_, Selection>(&sql)
            .fetch_all(self.db_manager.pool())
            .await?)
    }

    async fn get_selection(&self, id: i64) -> Result<Option<Selection>> {
        info!("{:<12} --> 셀렉션 조회 id: {}", "Query", id);
        let mut conn = self.db_manager.pool().acquire().await?;
        fetch_selection(&mut conn, id).await
    }

    async fn create_selection(&self, selection: NewSelection) -> Result<Selection> {
        info!("{:<12} --> 셀렉션 생성: {}", "Command", selection.name);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let id: i64 = sqlx::query_scalar(queries::INSERT_SELECTION)
                        .bind(&selection.name)
                        .bind(selection.owner_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    let items = normalize_items(selection.items);
                    if !items.is_empty() {
                        sqlx::query(queries::INSERT_SELECTION_ITEMS)
                            .bind(id)
                            .bind(items)
                            .execute(&mut **tx)
                            .await?;
                    }
                    fetch_selection(&mut **tx, id)
                        .await?
                        .ok_or(Error::NotFound("Selection"))
                })
            })
            .await
    }

    async fn update_selection(
        &self,
        id: i64,
        name: Option<String>,
        items: Option<Vec<i64>>,
    ) -> Result<Option<Selection>> {
        info!("{:<12} --> 셀렉션 수정 id: {}", "Command", id);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let exists: Option<i64> = sqlx::query_scalar(queries::LOCK_SELECTION)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if exists.is_none() {
                        return Ok(None);
                    }
                    if let Some(name) = name {
                        sqlx::query(queries::UPDATE_SELECTION_NAME)
                            .bind(name)
                            .bind(id)
                            .execute(&mut **tx)
                            .await?;
                    }
                    if let Some(items) = items {
                        sqlx::query(queries::CLEAR_SELECTION_ITEMS)
                            .bind(id)
                            .execute(&mut **tx)
                            .await?;
                        let items = normalize_items(items);
                        if !items.is_empty() {
                            sqlx::query(queries::INSERT_SELECTION_ITEMS)
                                .bind(id)
                                .bind(items)
                                .execute(&mut **tx)
                                .await?;
                        }
                    }
                    fetch_selection(&mut **tx, id).await
                })
            })
            .await
    }

    async fn delete_selection(&self, id: i64) -> Result<bool> {
        info!("{:<12} --> 셀렉션 삭제 id: {}", "Command", id);
        let result = sqlx::query(queries::DELETE_SELECTION)
            .bind(id)
            .execute(self.db_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self, window: Window) -> Result<(Vec<User>, usize)> {
        info!("{:<12} --> 사용자 목록 조회", "Query");
        let total: i64 = sqlx::query_scalar(queries::COUNT_USERS)
            .fetch_one(self.db_manager.pool())
            .await?;
        let sql = format!(
            "{} ORDER BY u.username LIMIT $1 OFFSET $2",
            queries::SELECT_USERS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(window.limit_i64())
            .bind(window.offset_i64())
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok((users, usize::try_from(total).unwrap_or_default()))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        info!("{:<12} --> 사용자 조회 id: {}", "Query", id);
        let mut conn = self.db_manager.pool().acquire().await?;
        fetch_user(&mut conn, id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.username = $1", queries::SELECT_USERS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.db_manager.pool())
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        info!("{:<12} --> 사용자 생성: {}", "Command", user.username);
        let result = self
            .db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let id: i64 = sqlx::query_scalar(queries::INSERT_USER)
                        .bind(&user.username)
                        .bind(&user.password_hash)
                        .bind(&user.first_name)
                        .bind(&user.last_name)
                        .bind(user.role)
                        .fetch_one(&mut **tx)
                        .await?;
                    replace_locations(&mut **tx, id, user.locations).await?;
                    fetch_user(&mut **tx, id).await?.ok_or(Error::NotFound("User"))
                })
            })
            .await;
        match result {
            Err(e) if is_unique_violation(&e) => {
                Err(Error::conflict("A user with that username already exists"))
            }
            other => other,
        }
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        info!("{:<12} --> 사용자 수정 id: {}", "Command", id);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let updated: Option<i64> = sqlx::query_scalar(queries::UPDATE_USER)
                        .bind(changes.first_name)
                        .bind(changes.last_name)
                        .bind(changes.password_hash)
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if updated.is_none() {
                        return Ok(None);
                    }
                    if let Some(locations) = changes.locations {
                        replace_locations(&mut **tx, id, locations).await?;
                    }
                    fetch_user(&mut **tx, id).await
                })
            })
            .await
    }

    async fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>> {
        info!("{:<12} --> 사용자 삭제 id: {}", "Command", id);
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let images: Vec<String> = sqlx::query_scalar(queries::USER_AD_IMAGES)
                        .bind(id)
                        .fetch_all(&mut **tx)
                        .await?;
                    let result = sqlx::query(queries::DELETE_USER)
                        .bind(id)
                        .execute(&mut **tx)
                        .await?;
                    Ok::<_, Error>((result.rows_affected() > 0).then_some(images))
                })
            })
            .await
    }

    async fn issue_token(&self, user_id: i64) -> Result<String> {
        Ok(sqlx::query_scalar(queries::ISSUE_TOKEN)
            .bind(generate_token())
            .bind(user_id)
            .fetch_one(self.db_manager.pool())
            .await?)
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<User>> {
        let user_id: Option<i64> = sqlx::query_scalar(queries::GET_TOKEN_USER)
            .bind(token)
            .fetch_optional(self.db_manager.pool())
            .await?;
        match user_id {
            Some(user_id) => {
                let mut conn = self.db_manager.pool().acquire().await?;
                fetch_user(&mut conn, user_id).await
            }
            None => Ok(None),
        }
    }
}

// endregion: --- Postgres Store
