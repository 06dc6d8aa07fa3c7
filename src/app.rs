// region:    --- Imports
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtKeys;
use crate::handlers;
use crate::media::FileStorage;
use crate::query::pager::Pager;
use crate::store::Store;

// endregion: --- Imports

// region:    --- App State

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn FileStorage>,
    pub pager: Pager,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        media: Arc<dyn FileStorage>,
        pager: Pager,
        jwt: Arc<JwtKeys>,
    ) -> Self {
        Self {
            store,
            media,
            pager,
            jwt,
        }
    }
}

// endregion: --- App State

// region:    --- Router

/// 라우터 설정
/// media_url 아래로 media_root 의 업로드 파일을 그대로 제공한다
pub fn router(
    state: AppState,
    media_root: &Path,
    media_url: &str,
    max_upload_bytes: usize,
) -> Router {
    // 프론트엔드 개발용 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::handle_root))
        // 카테고리
        .route("/cat/", get(handlers::handle_list_categories))
        .route("/cat/create/", post(handlers::handle_create_category))
        .route("/cat/:id/", get(handlers::handle_get_category))
        .route("/cat/:id/update/", patch(handlers::handle_update_category))
        .route("/cat/:id/delete/", delete(handlers::handle_delete_category))
        // 광고
        .route("/ad/", get(handlers::handle_list_ads))
        .route("/ad/create/", post(handlers::handle_create_ad))
        .route("/ad/:id/", get(handlers::handle_get_ad))
        .route("/ad/:id/update/", patch(handlers::handle_update_ad))
        .route("/ad/:id/delete/", delete(handlers::handle_delete_ad))
        .route("/ad/:id/upload_image/", post(handlers::handle_upload_image))
        // 셀렉션
        .route("/selection/", get(handlers::handle_list_selections))
        .route("/selection/create/", post(handlers::handle_create_selection))
        .route("/selection/:id/", get(handlers::handle_get_selection))
        .route(
            "/selection/:id/update/",
            patch(handlers::handle_update_selection),
        )
        .route(
            "/selection/:id/delete/",
            delete(handlers::handle_delete_selection),
        )
        // 사용자
        .route("/user/", get(handlers::handle_list_users))
        .route("/user/create/", post(handlers::handle_create_user))
        .route("/user/login/", post(handlers::handle_login))
        .route("/user/token/", post(handlers::handle_obtain_token_pair))
        .route("/user/token/refresh/", post(handlers::handle_refresh_token))
        .route("/user/:id/", get(handlers::handle_get_user))
        .route("/user/:id/update/", patch(handlers::handle_update_user))
        .route("/user/:id/delete/", delete(handlers::handle_delete_user))
        .nest_service(media_url.trim_end_matches('/'), ServeDir::new(media_root))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// endregion: --- Router
