//! 수익 기록 영속성 계층.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - SQLite 연결 풀 및 스키마 관리
//! - 일일 수익 기록 저장소 (날짜+봇 이름 기준 upsert)
//! - 일일/월간 수익 조회

pub mod database;
pub mod error;
pub mod profit;

pub use database::Database;
pub use error::{StoreError, StoreResult};
pub use profit::ProfitRepository;
