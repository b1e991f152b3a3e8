//! 텔레그램 봇 인터페이스.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 텔레그램 명령어 파싱 (/today, /month, /balance, /status)
//! - 인라인 키보드 및 callback_query 처리
//! - Long polling 기반 업데이트 수신
//! - 리포트 파사드와 연결된 명령어 핸들러

pub mod commands;
pub mod error;
pub mod handler;
pub mod poller;

pub use commands::BotCommand;
pub use error::{BotError, BotResult};
pub use handler::{BotCommandHandler, CommandResponse, ReportCommandHandler};
pub use poller::TelegramPoller;
