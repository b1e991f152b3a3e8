//! 봇 명령어 핸들러.
//!
//! 리포트 파사드의 조회 결과를 텔레그램 HTML 메시지로 변환합니다.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracker_report::Reporting;

use crate::error::BotResult;

/// 명령어 응답 데이터.
pub struct CommandResponse {
    /// 응답 텍스트 (HTML 형식)
    pub text: String,
    /// 파싱 모드
    pub parse_mode: String,
    /// 인라인 키보드 (옵션)
    pub reply_markup: Option<serde_json::Value>,
}

impl CommandResponse {
    /// HTML 형식 응답 생성.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: "HTML".to_string(),
            reply_markup: None,
        }
    }

    /// 인라인 키보드 추가.
    pub fn with_keyboard(mut self, markup: serde_json::Value) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// 메인 메뉴 인라인 키보드.
pub fn main_keyboard() -> serde_json::Value {
    serde_json::json!({
        "inline_keyboard": [
            [
                { "text": "📊 오늘 수익", "callback_data": "today_profit" },
                { "text": "📈 월간 리포트", "callback_data": "monthly_report" }
            ],
            [
                { "text": "💰 계좌 잔고", "callback_data": "account_balance" },
                { "text": "🤖 봇 현황", "callback_data": "bot_status" }
            ]
        ]
    })
}

/// 수익 부호에 따른 상태 이모지.
fn profit_emoji(value: Decimal) -> &'static str {
    if value > Decimal::ZERO {
        "🟢"
    } else if value < Decimal::ZERO {
        "🔴"
    } else {
        "⚪"
    }
}

/// 양수에 붙일 부호 접두사.
fn sign_prefix(value: Decimal) -> &'static str {
    if value >= Decimal::ZERO {
        "+"
    } else {
        ""
    }
}

/// 봇 명령어 핸들러 trait.
///
/// 각 명령어의 실제 로직을 구현합니다.
#[async_trait]
pub trait BotCommandHandler: Send + Sync {
    /// 시작 인사 및 메뉴 키보드.
    async fn handle_start(&self) -> BotResult<CommandResponse>;

    /// 오늘 수익 현황 조회.
    async fn handle_today(&self) -> BotResult<CommandResponse>;

    /// 이번 달 수익 리포트 조회.
    async fn handle_month(&self) -> BotResult<CommandResponse>;

    /// 실시간 계좌 잔고 조회.
    async fn handle_balance(&self) -> BotResult<CommandResponse>;

    /// 설정된 봇 현황 조회.
    async fn handle_status(&self) -> BotResult<CommandResponse>;
}

/// 리포트 파사드 기반 명령어 핸들러.
pub struct ReportCommandHandler {
    reporting: Arc<Reporting>,
}

impl ReportCommandHandler {
    /// 새 핸들러 생성.
    pub fn new(reporting: Arc<Reporting>) -> Self {
        Self { reporting }
    }
}

#[async_trait]
impl BotCommandHandler for ReportCommandHandler {
    async fn handle_start(&self) -> BotResult<CommandResponse> {
        let response = CommandResponse::html(
            "👋 <b>OKX 수익 추적 봇</b>\n\n\
             설정된 트레이딩 봇의 일일 수익을 추적합니다.\n\n\
             <b>사용 가능한 명령어:</b>\n\
             /today (t) - 📊 오늘 수익\n\
             /month (m) - 📈 월간 리포트\n\
             /balance (b) - 💰 계좌 잔고\n\
             /status (s) - 🤖 봇 현황\n\
             /help (h) - ❓ 도움말\n\n\
             아래 버튼으로도 조회할 수 있습니다.",
        );

        Ok(response.with_keyboard(main_keyboard()))
    }

    async fn handle_today(&self) -> BotResult<CommandResponse> {
        let Some(report) = self.reporting.today().await? else {
            return Ok(CommandResponse::html(
                "📊 <b>오늘 수익 현황</b>\n\n\
                 아직 기록된 수익 데이터가 없습니다.\n\
                 <i>다음 동기화 주기를 기다려 주세요.</i>",
            ));
        };

        let mut text = format!("📊 <b>오늘 수익 현황</b> ({})\n", report.date);

        for record in &report.records {
            let emoji = profit_emoji(record.profit_usdt);
            let sign = sign_prefix(record.profit_usdt);
            let pct_sign = sign_prefix(record.profit_percentage);
            text.push_str(&format!(
                "\n{emoji} <b>{name}</b> (<code>{symbol}</code>)\n\
                 수익: <b>{sign}{profit}</b> USDT ({pct_sign}{pct}%)\n\
                 체결: {trades}건\n",
                name = record.bot_name,
                symbol = record.symbol,
                profit = record.profit_usdt.round_dp(2),
                pct = record.profit_percentage.round_dp(2),
                trades = record.trades_count,
            ));
        }

        let total_sign = sign_prefix(report.total_profit_usdt);
        text.push_str(&format!(
            "\n💵 총 수익: <b>{total_sign}{} USDT</b>\n🔄 총 체결: {}건",
            report.total_profit_usdt.round_dp(2),
            report.total_trades
        ));

        Ok(CommandResponse::html(text))
    }

    async fn handle_month(&self) -> BotResult<CommandResponse> {
        let Some(report) = self.reporting.this_month().await? else {
            return Ok(CommandResponse::html(
                "📈 <b>월간 리포트</b>\n\n이번 달 수익 데이터가 없습니다.",
            ));
        };

        let mut text = format!("📈 <b>월간 리포트</b> ({})\n", report.month);

        for summary in &report.summaries {
            let emoji = profit_emoji(summary.total_profit_usdt);
            let sign = sign_prefix(summary.total_profit_usdt);
            let pct_sign = sign_prefix(summary.avg_profit_percentage);
            text.push_str(&format!(
                "\n{emoji} <b>{name}</b>\n\
                 월 수익: <b>{sign}{total}</b> USDT\n\
                 평균 수익률: {pct_sign}{pct}%\n\
                 체결 {trades}건 / 활동 {days}일\n",
                name = summary.bot_name,
                total = summary.total_profit_usdt.round_dp(2),
                pct = summary.avg_profit_percentage.round_dp(2),
                trades = summary.total_trades,
                days = summary.active_days,
            ));
        }

        let total_sign = sign_prefix(report.total_profit_usdt);
        text.push_str(&format!(
            "\n💵 월 총 수익: <b>{total_sign}{} USDT</b>\n🔄 월 총 체결: {}건",
            report.total_profit_usdt.round_dp(2),
            report.total_trades
        ));

        Ok(CommandResponse::html(text))
    }

    async fn handle_balance(&self) -> BotResult<CommandResponse> {
        let Some(balance) = self.reporting.live_balance().await else {
            return Ok(CommandResponse::html(
                "⚠️ <b>잔고를 조회할 수 없습니다</b>\n\n\
                 거래소 연결을 확인한 뒤 다시 시도하세요.",
            ));
        };

        let mut text = "💰 <b>계좌 잔고</b>\n".to_string();

        if balance.lines.is_empty() {
            text.push_str("\n보유 중인 통화가 없습니다.");
        }
        for line in &balance.lines {
            text.push_str(&format!(
                "\n<code>{}</code>: {}",
                line.currency,
                line.amount.round_dp(4).normalize()
            ));
        }

        text.push_str(&format!(
            "\n\n💵 USDT 잔고: <b>{} USDT</b>",
            balance.total_usdt.round_dp(2)
        ));

        Ok(CommandResponse::html(text))
    }

    async fn handle_status(&self) -> BotResult<CommandResponse> {
        let registry = self.reporting.registry();

        if registry.is_empty() {
            return Ok(CommandResponse::html(
                "🤖 <b>봇 현황</b>\n\n\
                 설정된 봇이 없습니다.\n\
                 <i>설정 파일의 [bots] 섹션을 확인하세요.</i>",
            ));
        }

        let mut text = format!("🤖 <b>봇 현황</b> ({}개 설정됨)\n", registry.len());
        for bot in registry.iter() {
            text.push_str(&format!(
                "\n• <b>{}</b>\n  <code>{}</code> / {} 전략\n",
                bot.name, bot.symbol, bot.strategy
            ));
        }

        Ok(CommandResponse::html(text))
    }
}
