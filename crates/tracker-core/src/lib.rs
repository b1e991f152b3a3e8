//! # Tracker Core
//!
//! OKX 트레이딩 봇 수익 추적기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일별 수익 기록 및 월별 집계 타입
//! - 봇 레지스트리 (설정 기반, 불변)
//! - 잔고 및 체결 데이터 구조체
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod logging;
pub mod types;

pub use config::*;
pub use logging::*;
pub use types::*;
