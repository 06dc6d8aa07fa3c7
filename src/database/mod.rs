use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use tracing::info;

use crate::config::Config;

pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성
    pub async fn new(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// 트랜잭션 실행
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// 데이터베이스 초기화
    /// reset 이면 기존 테이블을 지우고, 스키마가 없을 때만 생성한다
    pub async fn initialize_database(&self, reset: bool) -> Result<(), sqlx::Error> {
        if reset {
            let recreate_db_sql = include_str!("../sql/00-recreate-db.sql");
            self.execute_multi_query(recreate_db_sql).await?;
            info!("{:<12} --> 기존 스키마 삭제", "Database");
        }

        let exists: Option<String> = sqlx::query_scalar("SELECT to_regclass('public.ads')::TEXT")
            .fetch_one(&self.pool)
            .await?;
        if exists.is_none() {
            let create_schema_sql = include_str!("../sql/01-create-schema.sql");
            self.execute_multi_query(create_schema_sql).await?;
            info!("{:<12} --> 스키마 생성", "Database");
        }

        Ok(())
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
