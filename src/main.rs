// region:    --- Imports
use classified_ads::app::{self, AppState};
use classified_ads::config::Config;
use classified_ads::database::DatabaseManager;
use classified_ads::media::LocalFileStorage;
use classified_ads::query::pager::Pager;
use classified_ads::store::PgStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };
    info!("{:<12} --> 설정 로드: {:?}", "Main", config.bind_addr());

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database(config.reset_schema).await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 업로드 디렉터리 준비
    tokio::fs::create_dir_all(&config.media_root).await?;

    let state = AppState::new(
        Arc::new(PgStore::new(Arc::clone(&db_manager))),
        Arc::new(LocalFileStorage::new(
            config.media_root.clone(),
            config.media_url.clone(),
        )),
        Pager::new(config.page_size),
        Arc::new(config.jwt_keys()),
    );

    // 라우터 설정
    let routes_all = app::router(
        state,
        &config.media_root,
        &config.media_url,
        config.max_upload_bytes,
    );

    // 리스너 생성
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
