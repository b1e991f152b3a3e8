//! OKX 거래소 연동.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - OKX v5 REST API 요청 서명 (HMAC-SHA256)
//! - 계좌 잔고 조회
//! - 체결 내역(fills) 조회
//! - 에러 분류 및 처리

pub mod error;
pub mod okx;
pub mod sign;

pub use error::*;
pub use okx::{OkxClient, OkxConfig};
pub use sign::{iso_timestamp, sign};
