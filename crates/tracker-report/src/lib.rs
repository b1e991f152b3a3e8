//! 수익 리포트 조회 및 동기화.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Reporting: 일일/월간/잔고 리포트 조회 파사드
//! - ProfitSync: 거래소 체결 내역을 일일 수익 기록으로 변환하는 파이프라인

pub mod facade;
pub mod sync;

pub use facade::{BalanceReport, DailyReport, MonthlyReport, Reporting};
pub use sync::{ProfitSync, SyncStats};
