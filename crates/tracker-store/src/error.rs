//! 저장소 에러 타입.

use thiserror::Error;

/// 저장소 작업 결과.
pub type StoreResult<T> = Result<T, StoreError>;

/// 영속성 계층 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 데이터베이스 에러
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
