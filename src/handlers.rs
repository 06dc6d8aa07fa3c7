// region:    --- Imports
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::ads::model::{
    normalize_items, validate_ad_name, validate_category_name, validate_price,
    validate_selection_name, CategoryPayload, CreateAdRequest, CreateSelectionRequest, NewAd,
    NewSelection, UpdateAdRequest, UpdateSelectionRequest,
};
use crate::ads::views::{
    AdView, CategoryView, SelectionDetailView, SelectionListView, SelectionView, UserView,
};
use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::auth::jwt::{TokenKind, TokenPair};
use crate::error::{Error, Result};
use crate::extract::{Path, Payload};
use crate::query::filter::Visibility;
use crate::query::pager::Page;
use crate::query::params::{page_from_query, AdSearch};
use crate::store::Store;
use crate::users::model::{
    normalize_locations, CreateUserRequest, LoginRequest, NewUser, RefreshRequest,
    UpdateUserRequest, User, UserChanges, UserRole,
};
use crate::users::password::{hash_password, verify_password};

// endregion: --- Imports

fn status_ok() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 상태 확인
pub async fn handle_root() -> Json<Value> {
    status_ok()
}

// region:    --- Category Handlers

/// 카테고리 목록 (이름순)
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryView>>> {
    info!("{:<12} --> 카테고리 목록 요청", "Handler");
    let categories = state.store.list_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}

/// 카테고리 조회
pub async fn handle_get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryView>> {
    info!("{:<12} --> 카테고리 조회 요청 id: {}", "Handler", id);
    let category = state
        .store
        .get_category(id)
        .await?
        .ok_or(Error::NotFound("Category"))?;
    Ok(Json(category.into()))
}

/// 카테고리 생성 (관리자)
pub async fn handle_create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Payload(payload): Payload<CategoryPayload>,
) -> Result<Json<CategoryView>> {
    info!("{:<12} --> 카테고리 생성 요청: {:?}", "Handler", payload);
    user.require_admin()?;
    validate_category_name(&payload.name).map_err(Error::bad_request)?;

    let category = state.store.create_category(payload.name.trim()).await?;
    Ok(Json(category.into()))
}

/// 카테고리 이름 수정 (관리자)
pub async fn handle_update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Payload(payload): Payload<CategoryPayload>,
) -> Result<Json<CategoryView>> {
    info!("{:<12} --> 카테고리 수정 요청 id: {}", "Handler", id);
    user.require_admin()?;
    validate_category_name(&payload.name).map_err(Error::bad_request)?;

    let category = state
        .store
        .update_category(id, payload.name.trim())
        .await?
        .ok_or(Error::NotFound("Category"))?;
    Ok(Json(category.into()))
}

/// 카테고리 삭제 (관리자)
pub async fn handle_delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 카테고리 삭제 요청 id: {}", "Handler", id);
    user.require_admin()?;

    if !state.store.delete_category(id).await? {
        return Err(Error::NotFound("Category"));
    }
    Ok(status_ok())
}

// endregion: --- Category Handlers

// region:    --- Ad Handlers

/// 광고 목록 검색: 필터 -> 페이지 -> 응답 변환
pub async fn handle_list_ads(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<AdView>>> {
    info!("{:<12} --> 광고 목록 요청: {:?}", "Handler", raw);
    let search = AdSearch::from_query(raw.as_deref())?;
    let filter = search
        .filter
        .with_visibility(Visibility::PublishedOrAuthoredBy(viewer.map(|u| u.id())));

    let window = state.pager.window(search.page);
    let (rows, total) = state.store.search_ads(&filter, window).await?;

    let media = state.media.as_ref();
    let page = state
        .pager
        .page(rows, total)
        .map(|row| AdView::project(&row, media));
    Ok(Json(page))
}

/// 광고 상세 조회. 게시되지 않은 광고는 작성자만 볼 수 있다
pub async fn handle_get_ad(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<AdView>> {
    info!("{:<12} --> 광고 조회 요청 id: {}", "Handler", id);
    let row = state
        .store
        .get_ad(id)
        .await?
        .filter(|row| row.ad.is_published || row.ad.author_id == user.id())
        .ok_or(Error::NotFound("Ad"))?;
    Ok(Json(AdView::project(&row, state.media.as_ref())))
}

/// 광고 생성. 작성자는 요청 사용자
pub async fn handle_create_ad(
    State(state): State<AppState>,
    user: CurrentUser,
    Payload(req): Payload<CreateAdRequest>,
) -> Result<Json<AdView>> {
    info!("{:<12} --> 광고 생성 요청: {:?}", "Handler", req);
    if let Some(author_id) = req.author_id {
        if author_id != user.id() {
            return Err(Error::forbidden("You can only create ads as yourself."));
        }
    }
    validate_ad_name(&req.name).map_err(Error::bad_request)?;
    validate_price(req.price).map_err(Error::bad_request)?;
    ensure_category(state.store.as_ref(), req.category_id).await?;

    let row = state
        .store
        .create_ad(NewAd {
            name: req.name,
            author_id: user.id(),
            price: req.price,
            description: req.description,
            is_published: req.is_published,
            category_id: req.category_id,
        })
        .await?;
    Ok(Json(AdView::project(&row, state.media.as_ref())))
}

/// 광고 부분 수정 (작성자)
pub async fn handle_update_ad(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Payload(changes): Payload<UpdateAdRequest>,
) -> Result<Json<AdView>> {
    info!("{:<12} --> 광고 수정 요청 id: {}, {:?}", "Handler", id, changes);
    let row = state
        .store
        .get_ad(id)
        .await?
        .ok_or(Error::NotFound("Ad"))?;
    user.require_owner(row.ad.author_id)?;

    if let Some(name) = &changes.name {
        validate_ad_name(name).map_err(Error::bad_request)?;
    }
    if let Some(price) = changes.price {
        validate_price(price).map_err(Error::bad_request)?;
    }
    if let Some(category_id) = changes.category_id {
        ensure_category(state.store.as_ref(), category_id).await?;
    }

    let row = state
        .store
        .update_ad(id, &changes)
        .await?
        .ok_or(Error::NotFound("Ad"))?;
    Ok(Json(AdView::project(&row, state.media.as_ref())))
}

/// 광고 삭제 (작성자). 첨부 이미지도 지운다
pub async fn handle_delete_ad(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 광고 삭제 요청 id: {}", "Handler", id);
    let row = state
        .store
        .get_ad(id)
        .await?
        .ok_or(Error::NotFound("Ad"))?;
    user.require_owner(row.ad.author_id)?;

    if !state.store.delete_ad(id).await? {
        return Err(Error::NotFound("Ad"));
    }
    if let Some(image) = &row.ad.image {
        remove_file(&state, image).await;
    }
    Ok(status_ok())
}

/// 광고 이미지 업로드 (작성자)
/// `image` 필드가 없거나 비어 있으면 이미지를 제거한다
pub async fn handle_upload_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AdView>> {
    info!("{:<12} --> 이미지 업로드 요청 id: {}", "Handler", id);
    let row = state
        .store
        .get_ad(id)
        .await?
        .ok_or(Error::NotFound("Ad"))?;
    user.require_owner(row.ad.author_id)?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("image").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::bad_request(format!("Invalid image upload: {e}")))?;
        upload = Some((filename, data));
        break;
    }

    let new_key = match upload {
        Some((filename, data)) if !data.is_empty() => {
            Some(state.media.save(&filename, &data).await?)
        }
        _ => None,
    };

    let previous = match state.store.set_ad_image(id, new_key.clone()).await {
        Ok(Some(previous)) => previous,
        result => {
            // 업로드 중 광고가 삭제됐거나 저장 실패. 새 파일은 남기지 않는다
            if let Some(key) = &new_key {
                remove_file(&state, key).await;
            }
            return Err(result.err().unwrap_or(Error::NotFound("Ad")));
        }
    };
    if let Some(old) = previous.filter(|old| Some(old) != new_key.as_ref()) {
        remove_file(&state, &old).await;
    }

    let row = state
        .store
        .get_ad(id)
        .await?
        .ok_or(Error::NotFound("Ad"))?;
    Ok(Json(AdView::project(&row, state.media.as_ref())))
}

async fn ensure_category(store: &dyn Store, category_id: i64) -> Result<()> {
    store
        .get_category(category_id)
        .await?
        .map(|_| ())
        .ok_or(Error::NotFound("Category"))
}

/// 파일 삭제 실패는 기록만 한다
async fn remove_file(state: &AppState, key: &str) {
    if let Err(e) = state.media.delete(key).await {
        warn!("{:<12} --> 파일 삭제 실패 {}: {:#}", "Handler", key, e);
    }
}

// endregion: --- Ad Handlers

// region:    --- Selection Handlers

/// 셀렉션 목록
pub async fn handle_list_selections(
    State(state): State<AppState>,
) -> Result<Json<Vec<SelectionListView>>> {
    info!("{:<12} --> 셀렉션 목록 요청", "Handler");
    let selections = state.store.list_selections().await?;
    Ok(Json(selections.iter().map(SelectionListView::from).collect()))
}

/// 셀렉션 상세: 소유자 username 과 광고 전체
pub async fn handle_get_selection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SelectionDetailView>> {
    info!("{:<12} --> 셀렉션 조회 요청 id: {}", "Handler", id);
    let selection = state
        .store
        .get_selection(id)
        .await?
        .ok_or(Error::NotFound("Selection"))?;
    let owner = state
        .store
        .get_user(selection.owner_id)
        .await?
        .ok_or(Error::NotFound("User"))?;
    let rows = state.store.ads_by_ids(&selection.items).await?;

    Ok(Json(SelectionDetailView {
        id: selection.id,
        name: selection.name,
        owner: owner.username,
        items: AdView::project_all(&rows, state.media.as_ref()),
    }))
}

/// 셀렉션 생성. 소유자는 요청 사용자
pub async fn handle_create_selection(
    State(state): State<AppState>,
    user: CurrentUser,
    Payload(req): Payload<CreateSelectionRequest>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 셀렉션 생성 요청: {:?}", "Handler", req);
    validate_selection_name(&req.name).map_err(Error::bad_request)?;
    let items = ensure_ads(state.store.as_ref(), req.items).await?;

    let selection = state
        .store
        .create_selection(NewSelection {
            name: req.name,
            owner_id: user.id(),
            items,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(SelectionView::from(selection))))
}

/// 셀렉션 수정 (소유자). items 는 집합 전체 교체
pub async fn handle_update_selection(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Payload(req): Payload<UpdateSelectionRequest>,
) -> Result<Json<SelectionView>> {
    info!("{:<12} --> 셀렉션 수정 요청 id: {}, {:?}", "Handler", id, req);
    let selection = state
        .store
        .get_selection(id)
        .await?
        .ok_or(Error::NotFound("Selection"))?;
    user.require_owner(selection.owner_id)?;

    if let Some(name) = &req.name {
        validate_selection_name(name).map_err(Error::bad_request)?;
    }
    let items = match req.items {
        Some(items) => Some(ensure_ads(state.store.as_ref(), items).await?),
        None => None,
    };

    let selection = state
        .store
        .update_selection(id, req.name, items)
        .await?
        .ok_or(Error::NotFound("Selection"))?;
    Ok(Json(selection.into()))
}

/// 셀렉션 삭제 (소유자)
pub async fn handle_delete_selection(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 셀렉션 삭제 요청 id: {}", "Handler", id);
    let selection = state
        .store
        .get_selection(id)
        .await?
        .ok_or(Error::NotFound("Selection"))?;
    user.require_owner(selection.owner_id)?;

    if !state.store.delete_selection(id).await? {
        return Err(Error::NotFound("Selection"));
    }
    Ok(status_ok())
}

/// 존재하지 않는 광고 id 가 섞여 있으면 400
async fn ensure_ads(store: &dyn Store, items: Vec<i64>) -> Result<Vec<i64>> {
    let items = normalize_items(items);
    let found: Vec<i64> = store
        .ads_by_ids(&items)
        .await?
        .iter()
        .map(|row| row.ad.id)
        .collect();
    let missing: Vec<String> = items
        .iter()
        .filter(|id| !found.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::bad_request(format!(
            "Ad does not exist: {}",
            missing.join(", ")
        )));
    }
    Ok(items)
}

// endregion: --- Selection Handlers

// region:    --- User Handlers

/// 사용자 목록 (username 순, 페이지)
pub async fn handle_list_users(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<UserView>>> {
    info!("{:<12} --> 사용자 목록 요청", "Handler");
    let window = state.pager.window(page_from_query(raw.as_deref()));
    let (users, total) = state.store.list_users(window).await?;
    Ok(Json(state.pager.page(users, total).map(UserView::from)))
}

/// 사용자 조회
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserView>> {
    info!("{:<12} --> 사용자 조회 요청 id: {}", "Handler", id);
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or(Error::NotFound("User"))?;
    Ok(Json(user.into()))
}

/// 회원 가입. 역할은 항상 member
pub async fn handle_create_user(
    State(state): State<AppState>,
    Payload(req): Payload<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 회원 가입 요청: {}", "Handler", req.username);
    let username = req.username.trim();
    if username.is_empty() {
        return Err(Error::bad_request("Username must not be empty"));
    }
    if req.password.is_empty() {
        return Err(Error::bad_request("Password must not be empty"));
    }

    let user = state
        .store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: hash_password(&req.password)?,
            first_name: req.first_name,
            last_name: req.last_name,
            role: UserRole::Member,
            locations: normalize_locations(req.locations),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// 사용자 정보 수정 (본인)
pub async fn handle_update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Payload(req): Payload<UpdateUserRequest>,
) -> Result<Json<UserView>> {
    info!("{:<12} --> 사용자 수정 요청 id: {}", "Handler", id);
    user.require_owner(id)?;

    let password_hash = match req.password.as_deref() {
        Some("") => return Err(Error::bad_request("Password must not be empty")),
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let changes = UserChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        password_hash,
        locations: req.locations.map(normalize_locations),
    };

    let updated = state
        .store
        .update_user(id, changes)
        .await?
        .ok_or(Error::NotFound("User"))?;
    Ok(Json(updated.into()))
}

/// 회원 탈퇴 (본인). 광고와 그 이미지, 셀렉션, 토큰도 삭제된다
pub async fn handle_delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 사용자 삭제 요청 id: {}", "Handler", id);
    user.require_owner(id)?;

    let images = state
        .store
        .delete_user(id)
        .await?
        .ok_or(Error::NotFound("User"))?;
    for image in &images {
        remove_file(&state, image).await;
    }
    Ok(status_ok())
}

/// 로그인: 토큰 발급
pub async fn handle_login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 로그인 요청: {}", "Handler", req.username);
    let user = authenticate(state.store.as_ref(), &req).await?;

    let token = state.store.issue_token(user.id).await?;
    Ok(Json(json!({ "token": token })))
}

/// JWT access/refresh 토큰 쌍 발급
pub async fn handle_obtain_token_pair(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> Result<Json<TokenPair>> {
    info!("{:<12} --> JWT 발급 요청: {}", "Handler", req.username);
    let user = authenticate(state.store.as_ref(), &req).await?;
    Ok(Json(state.jwt.issue_pair(user.id)?))
}

/// refresh 토큰으로 새 access 토큰 발급
pub async fn handle_refresh_token(
    State(state): State<AppState>,
    Payload(req): Payload<RefreshRequest>,
) -> Result<Json<Value>> {
    info!("{:<12} --> JWT 갱신 요청", "Handler");
    let user_id = state.jwt.verify(&req.refresh, TokenKind::Refresh)?;
    // 탈퇴한 사용자의 refresh 토큰은 무효
    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or(Error::InvalidToken)?;

    let access = state.jwt.issue(user.id, TokenKind::Access)?;
    Ok(Json(json!({ "access": access })))
}

/// username/password 확인. 실패 사유는 구분하지 않는다
async fn authenticate(store: &dyn Store, req: &LoginRequest) -> Result<User> {
    store
        .get_user_by_username(req.username.trim())
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or(Error::Unauthenticated)
}

// endregion: --- User Handlers
