//! 텔레그램 long polling 수신기.
//!
//! 사용자로부터 명령어와 인라인 키보드 입력을 수신하고 처리합니다.
//! - `/today` - 오늘 수익 현황
//! - `/month` - 월간 리포트
//! - `/balance` - 계좌 잔고
//! - `/status` - 봇 현황

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use tracker_core::TelegramConfig;

use crate::commands::BotCommand;
use crate::error::{BotError, BotResult};
use crate::handler::{BotCommandHandler, CommandResponse};

/// 텔레그램 봇 업데이트 응답.
#[derive(Debug, Deserialize)]
struct TelegramUpdates {
    ok: bool,
    result: Vec<TelegramUpdate>,
}

/// 개별 업데이트.
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
    callback_query: Option<TelegramCallbackQuery>,
}

/// 메시지 정보.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TelegramMessage {
    message_id: i64,
    from: Option<TelegramUser>,
    chat: TelegramChat,
    text: Option<String>,
    date: i64,
}

/// 사용자 정보.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TelegramUser {
    id: i64,
    username: Option<String>,
}

/// 채팅 정보.
#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// 인라인 키보드 버튼 입력.
#[derive(Debug, Deserialize)]
struct TelegramCallbackQuery {
    id: String,
    from: TelegramUser,
    message: Option<TelegramMessage>,
    data: Option<String>,
}

/// 사용자 허용 여부 확인.
///
/// 허용 목록이 비어 있으면 모든 사용자를 허용합니다.
fn is_authorized(allowed: &[i64], user_id: i64) -> bool {
    allowed.is_empty() || allowed.contains(&user_id)
}

/// 텔레그램 봇 수신기.
///
/// Long polling으로 업데이트를 수신하고 명령어를 처리합니다.
pub struct TelegramPoller<H: BotCommandHandler> {
    config: TelegramConfig,
    client: reqwest::Client,
    handler: Arc<H>,
    last_update_id: RwLock<i64>,
}

impl<H: BotCommandHandler> TelegramPoller<H> {
    /// 새 수신기 생성.
    pub fn new(config: TelegramConfig, handler: Arc<H>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            handler,
            last_update_id: RwLock::new(0),
        }
    }

    /// 봇 폴링 시작.
    ///
    /// 무한 루프로 업데이트를 수신합니다.
    pub async fn start_polling(&self) {
        info!("텔레그램 봇 폴링 시작");

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        if let Err(e) = self.process_update(update).await {
                            error!("업데이트 처리 실패: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("업데이트 폴링 실패: {}", e);
                    // 에러 발생 시 잠시 대기
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// 업데이트 폴링.
    async fn poll_updates(&self) -> BotResult<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;

        let url = format!(
            "https://api.telegram.org/bot{}/getUpdates",
            self.config.bot_token
        );

        let params = serde_json::json!({
            "offset": last_id + 1,
            "timeout": self.config.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });

        let response = self
            .client
            .post(&url)
            .json(&params)
            .timeout(Duration::from_secs(self.config.poll_timeout_secs + 5))
            .send()
            .await?;

        let updates: TelegramUpdates = response.json().await?;

        if !updates.ok {
            return Err(BotError::SendFailed("텔레그램 API 응답 실패".to_string()));
        }

        // 마지막 업데이트 ID 갱신
        if let Some(last) = updates.result.last() {
            *self.last_update_id.write().await = last.update_id;
        }

        Ok(updates.result)
    }

    /// 개별 업데이트 처리.
    async fn process_update(&self, update: TelegramUpdate) -> BotResult<()> {
        if let Some(callback) = update.callback_query {
            return self.process_callback(callback).await;
        }

        let Some(message) = update.message else {
            return Ok(());
        };

        let chat_id = message.chat.id;
        let user_id = message.from.as_ref().map(|u| u.id).unwrap_or(chat_id);

        let Some(text) = message.text else {
            return Ok(());
        };

        if !is_authorized(&self.config.allowed_user_ids, user_id) {
            // 명령어 시도에만 거부 메시지 응답
            if text.starts_with('/') {
                warn!(user_id = user_id, "허용되지 않은 사용자의 명령어 거부");
                let refusal = CommandResponse::html("⛔ 이 봇을 사용할 권한이 없습니다.");
                return self.send_response(chat_id, &refusal).await;
            }
            return Ok(());
        }

        debug!(
            chat_id = chat_id,
            text = %text,
            "명령어 수신"
        );

        let command = BotCommand::parse(&text);
        let response = self.execute_or_report(command).await;

        self.send_response(chat_id, &response).await
    }

    /// 인라인 키보드 입력 처리.
    async fn process_callback(&self, callback: TelegramCallbackQuery) -> BotResult<()> {
        // 버튼 로딩 표시 해제
        self.answer_callback(&callback.id).await?;

        let Some(message) = callback.message else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if !is_authorized(&self.config.allowed_user_ids, callback.from.id) {
            warn!(user_id = callback.from.id, "허용되지 않은 사용자의 버튼 입력 무시");
            return Ok(());
        }

        let Some(data) = callback.data else {
            return Ok(());
        };

        let Some(command) = BotCommand::from_callback(&data) else {
            debug!(data = %data, "알 수 없는 callback_data");
            return Ok(());
        };

        debug!(chat_id = chat_id, data = %data, "버튼 입력 수신");

        let response = self.execute_or_report(command).await;
        self.send_response(chat_id, &response).await
    }

    /// 명령어 실행. 실패하면 사용자에게 보여줄 오류 메시지로 대체합니다.
    async fn execute_or_report(&self, command: BotCommand) -> CommandResponse {
        match self.execute_command(command).await {
            Ok(response) => response,
            Err(e) => {
                error!("명령어 처리 실패: {}", e);
                CommandResponse::html(
                    "⚠️ 요청을 처리하는 중 오류가 발생했습니다.\n잠시 후 다시 시도하세요.",
                )
            }
        }
    }

    /// 명령어 실행.
    async fn execute_command(&self, command: BotCommand) -> BotResult<CommandResponse> {
        match command {
            BotCommand::Start => self.handler.handle_start().await,
            BotCommand::Today => self.handler.handle_today().await,
            BotCommand::Month => self.handler.handle_month().await,
            BotCommand::Balance => self.handler.handle_balance().await,
            BotCommand::Status => self.handler.handle_status().await,
            BotCommand::Help => Ok(self.help_message()),
            BotCommand::Unknown(text) => Ok(CommandResponse::html(format!(
                "❓ <b>알 수 없는 명령어</b>\n\n\
                 입력: <code>{}</code>\n\n\
                 /help 명령어로 사용 가능한 명령어를 확인하세요.",
                text
            ))),
        }
    }

    /// 도움말 메시지 생성.
    fn help_message(&self) -> CommandResponse {
        CommandResponse::html(
            "🤖 <b>OKX 수익 추적 봇</b>\n\n\
             <b>사용 가능한 명령어:</b>\n\n\
             /today (t) - 📊 오늘 수익 현황\n\
             /month (m) - 📈 월간 리포트\n\
             /balance (b) - 💰 계좌 잔고\n\
             /status (s) - 🤖 봇 현황\n\
             /help (h) - ❓ 도움말\n\n\
             <i>/start 로 메뉴 키보드를 다시 열 수 있습니다.</i>",
        )
    }

    /// callback_query 응답 (버튼 로딩 해제).
    async fn answer_callback(&self, callback_id: &str) -> BotResult<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/answerCallbackQuery",
            self.config.bot_token
        );

        let params = serde_json::json!({
            "callback_query_id": callback_id,
        });

        self.client.post(&url).json(&params).send().await?;

        Ok(())
    }

    /// 응답 메시지 전송.
    async fn send_response(&self, chat_id: i64, response: &CommandResponse) -> BotResult<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        );

        let mut params = serde_json::json!({
            "chat_id": chat_id,
            "text": response.text,
            "parse_mode": response.parse_mode,
            "disable_web_page_preview": true,
        });
        if let Some(markup) = &response.reply_markup {
            params["reply_markup"] = markup.clone();
        }

        let api_response = self.client.post(&url).json(&params).send().await?;

        if api_response.status().is_success() {
            debug!(chat_id = chat_id, "응답 전송 완료");
            Ok(())
        } else {
            let status = api_response.status();
            let body = api_response.text().await.unwrap_or_default();

            // 요청 한도 제한 확인
            if status.as_u16() == 429 {
                warn!("텔레그램 요청 한도 초과");
                return Err(BotError::RateLimited(60));
            }

            error!("응답 전송 실패: {} - {}", status, body);
            Err(BotError::SendFailed(format!("HTTP {}: {}", status, body)))
        }
    }
}
