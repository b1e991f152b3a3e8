//! 봇 명령어 파싱.

/// 봇 명령어 타입.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// 시작 인사 및 메뉴 키보드
    Start,
    /// 오늘 수익 현황
    Today,
    /// 이번 달 수익 리포트
    Month,
    /// 실시간 계좌 잔고
    Balance,
    /// 설정된 봇 현황
    Status,
    /// 도움말
    Help,
    /// 알 수 없는 명령어
    Unknown(String),
}

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        // /명령어 형식 확인
        if !text.starts_with('/') {
            return BotCommand::Unknown(text.to_string());
        }

        let parts: Vec<&str> = text[1..].split_whitespace().collect();
        let command = parts.first().map(|s| s.to_lowercase());

        match command.as_deref() {
            Some("start") => BotCommand::Start,
            Some("today") | Some("t") => BotCommand::Today,
            Some("month") | Some("m") => BotCommand::Month,
            Some("balance") | Some("b") => BotCommand::Balance,
            Some("status") | Some("s") => BotCommand::Status,
            Some("help") | Some("h") => BotCommand::Help,
            _ => BotCommand::Unknown(text.to_string()),
        }
    }

    /// 인라인 키보드 callback_data에서 명령어 변환.
    ///
    /// 알 수 없는 데이터는 `None`을 반환합니다.
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "today_profit" => Some(BotCommand::Today),
            "monthly_report" => Some(BotCommand::Month),
            "account_balance" => Some(BotCommand::Balance),
            "bot_status" => Some(BotCommand::Status),
            _ => None,
        }
    }
}
