//! 핵심 도메인 타입.
//!
//! 수익 추적 시스템 전반에서 사용되는 기본 타입을 정의합니다.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 트레이딩 봇의 매매 전략.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// 분할 매수 (Dollar Cost Averaging)
    Dca,
    /// 그리드 매매
    Grid,
    /// 마틴게일
    Martingale,
    /// 기타 전략
    Other,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Dca => "DCA",
            Strategy::Grid => "Grid",
            Strategy::Martingale => "Martingale",
            Strategy::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

/// 추적 대상 봇 설정.
///
/// 설정 파일에서 로드되며 프로세스 수명 동안 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// 봇 이름 (레지스트리 내 고유)
    pub name: String,
    /// 거래 심볼 (예: "BTC-USDT")
    pub symbol: String,
    /// 매매 전략
    pub strategy: Strategy,
}

/// 불변 봇 레지스트리.
///
/// 설정에서 한 번 생성되어 리포팅/동기화 컴포넌트에 값으로 전달됩니다.
/// 이름 기준으로 정렬되어 순회 순서가 결정적입니다.
#[derive(Debug, Clone, Default)]
pub struct BotRegistry {
    bots: Vec<BotConfig>,
}

impl BotRegistry {
    /// 봇 목록에서 레지스트리를 생성합니다.
    pub fn new(mut bots: Vec<BotConfig>) -> Self {
        bots.sort_by(|a, b| a.name.cmp(&b.name));
        Self { bots }
    }

    /// 이름으로 봇을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&BotConfig> {
        self.bots.iter().find(|b| b.name == name)
    }

    /// 등록된 봇을 이름순으로 순회합니다.
    pub fn iter(&self) -> std::slice::Iter<'_, BotConfig> {
        self.bots.iter()
    }

    /// 등록된 봇 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.bots.len()
    }

    /// 레지스트리가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}

/// 일별 봇 수익 기록.
///
/// `(date, bot_name)` 쌍마다 최대 하나의 기록이 존재하며,
/// 같은 키에 대한 재기록은 이전 값을 덮어씁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProfitRecord {
    /// 기준 날짜
    pub date: NaiveDate,
    /// 봇 이름
    pub bot_name: String,
    /// 거래 심볼
    pub symbol: String,
    /// 일별 순수익 (USDT, 음수 가능)
    pub profit_usdt: Decimal,
    /// 일별 수익률 (%, 음수 가능)
    pub profit_percentage: Decimal,
    /// 체결 횟수
    pub trades_count: u32,
    /// 기록 시각
    pub recorded_at: DateTime<Utc>,
}

impl DailyProfitRecord {
    /// 새 수익 기록을 생성합니다. 기록 시각은 현재 시각으로 설정됩니다.
    pub fn new(
        date: NaiveDate,
        bot_name: impl Into<String>,
        symbol: impl Into<String>,
        profit_usdt: Decimal,
        profit_percentage: Decimal,
        trades_count: u32,
    ) -> Self {
        Self {
            date,
            bot_name: bot_name.into(),
            symbol: symbol.into(),
            profit_usdt,
            profit_percentage,
            trades_count,
            recorded_at: Utc::now(),
        }
    }
}

/// 봇별 월간 수익 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBotSummary {
    /// 봇 이름
    pub bot_name: String,
    /// 월간 총 수익 (USDT)
    pub total_profit_usdt: Decimal,
    /// 활동일 기준 평균 수익률 (%, 거래량 가중 아님)
    pub avg_profit_percentage: Decimal,
    /// 월간 총 체결 횟수
    pub total_trades: u32,
    /// 기록이 있는 날짜 수
    pub active_days: u32,
}

/// 계좌 잔고 라인.
///
/// 거래소 조회 시점의 일시적 데이터이며 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceLine {
    /// 통화 코드 (예: "USDT", "BTC")
    pub currency: String,
    /// 현금 잔고
    pub amount: Decimal,
}

/// 거래소 체결 내역.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// 거래 심볼
    pub inst_id: String,
    /// 체결 ID
    pub trade_id: String,
    /// 주문 ID
    pub order_id: String,
    /// 매매 방향 ("buy" / "sell")
    pub side: String,
    /// 체결 가격
    pub fill_px: Decimal,
    /// 체결 수량
    pub fill_sz: Decimal,
    /// 체결 손익
    pub fill_pnl: Decimal,
    /// 수수료 (거래소는 음수로 보고)
    pub fee: Decimal,
    /// 수수료 통화
    pub fee_ccy: String,
    /// 체결 시각
    pub ts: DateTime<Utc>,
}

impl Fill {
    /// 체결 명목 금액 (가격 × 수량)을 반환합니다.
    pub fn notional(&self) -> Decimal {
        self.fill_px * self.fill_sz
    }
}
