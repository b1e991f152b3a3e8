//! 봇 에러 타입.

use thiserror::Error;
use tracker_store::StoreError;

/// 봇 작업 결과.
pub type BotResult<T> = Result<T, BotError>;

/// 텔레그램 봇 에러.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("메시지 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("조회 실패: {0}")]
    Query(String),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<StoreError> for BotError {
    fn from(err: StoreError) -> Self {
        BotError::Query(err.to_string())
    }
}
