//! 데이터베이스 연결 및 스키마 관리.

use crate::error::StoreResult;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use tracing::info;

/// SQLite 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// 새 데이터베이스 연결 생성.
    ///
    /// 파일이 없으면 생성하고 스키마를 초기화합니다.
    pub async fn new(db_path: &str) -> StoreResult<Self> {
        // 상위 디렉터리 생성
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let connection_string = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await?;

        let db = Self { pool };
        db.initialize_schema().await?;

        info!(db_path = %db_path, "데이터베이스 초기화 완료");
        Ok(db)
    }

    /// 인메모리 데이터베이스 생성 (테스트용).
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// 연결 풀 반환.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// 스키마 초기화.
    ///
    /// 일일 수익은 (date, bot_name) 복합 키로 저장되어
    /// 같은 날짜를 다시 동기화해도 봇당 하루 한 행만 유지됩니다.
    async fn initialize_schema(&self) -> StoreResult<()> {
        // 일일 수익 테이블
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_profits (
                date TEXT NOT NULL,
                bot_name TEXT NOT NULL,
                symbol TEXT NOT NULL,
                profit_usdt TEXT NOT NULL DEFAULT '0',
                profit_percentage TEXT NOT NULL DEFAULT '0',
                trades_count INTEGER NOT NULL DEFAULT 0,
                recorded_at TEXT NOT NULL,
                PRIMARY KEY (date, bot_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 봇 상태 테이블 (상태 보고 확장용)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bot_status (
                bot_name TEXT PRIMARY KEY,
                is_active INTEGER NOT NULL DEFAULT 1,
                last_update TEXT,
                total_profit TEXT NOT NULL DEFAULT '0',
                total_trades INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_daily_profits_bot ON daily_profits(bot_name)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 데이터베이스 연결 종료.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
