//! 리포트 조회 파사드.
//!
//! 저장소와 거래소 클라이언트를 묶어 텔레그램 핸들러가 사용하는
//! 조회 연산을 제공합니다.
//!
//! 기록 조회는 "데이터 없음"(Ok(None))과 "조회 실패"(Err)를 구분합니다.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::warn;
use tracker_core::{BalanceLine, BotRegistry, DailyProfitRecord, MonthlyBotSummary};
use tracker_exchange::OkxClient;
use tracker_store::{Database, ProfitRepository, StoreResult};

/// 특정 날짜의 봇별 수익 리포트.
#[derive(Debug, Clone)]
pub struct DailyReport {
    /// 조회 날짜
    pub date: NaiveDate,
    /// 봇별 기록 (봇 이름순)
    pub records: Vec<DailyProfitRecord>,
    /// 전체 수익 합계 (USDT)
    pub total_profit_usdt: Decimal,
    /// 전체 체결 수
    pub total_trades: u32,
}

/// 특정 월의 봇별 수익 리포트.
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    /// 조회 월 ("YYYY-MM")
    pub month: String,
    /// 봇별 요약 (봇 이름순)
    pub summaries: Vec<MonthlyBotSummary>,
    /// 전체 수익 합계 (USDT)
    pub total_profit_usdt: Decimal,
    /// 전체 체결 수
    pub total_trades: u32,
}

/// 실시간 계좌 잔고 리포트.
#[derive(Debug, Clone)]
pub struct BalanceReport {
    /// 잔고가 0보다 큰 통화 목록
    pub lines: Vec<BalanceLine>,
    /// USDT 잔고 합계 (다른 통화는 환산하지 않음)
    pub total_usdt: Decimal,
}

/// USDT 항목만 합산합니다.
pub fn usdt_total(lines: &[BalanceLine]) -> Decimal {
    lines
        .iter()
        .filter(|line| line.currency == "USDT")
        .map(|line| line.amount)
        .sum()
}

/// 리포트 조회 파사드.
#[derive(Clone)]
pub struct Reporting {
    db: Database,
    client: OkxClient,
    registry: BotRegistry,
}

impl Reporting {
    /// 새 파사드 생성.
    pub fn new(db: Database, client: OkxClient, registry: BotRegistry) -> Self {
        Self {
            db,
            client,
            registry,
        }
    }

    /// 설정된 봇 레지스트리 반환.
    pub fn registry(&self) -> &BotRegistry {
        &self.registry
    }

    /// 오늘(UTC)의 수익 리포트 조회.
    pub async fn today(&self) -> StoreResult<Option<DailyReport>> {
        self.daily(Utc::now().date_naive()).await
    }

    /// 특정 날짜의 수익 리포트 조회.
    ///
    /// 기록이 없으면 `Ok(None)`을 반환합니다.
    pub async fn daily(&self, date: NaiveDate) -> StoreResult<Option<DailyReport>> {
        let records = ProfitRepository::new(&self.db).daily_summary(date).await?;
        if records.is_empty() {
            return Ok(None);
        }

        let total_profit_usdt = records.iter().map(|r| r.profit_usdt).sum();
        let total_trades = records.iter().map(|r| r.trades_count).sum();

        Ok(Some(DailyReport {
            date,
            records,
            total_profit_usdt,
            total_trades,
        }))
    }

    /// 이번 달(UTC)의 수익 리포트 조회.
    pub async fn this_month(&self) -> StoreResult<Option<MonthlyReport>> {
        let month = Utc::now().format("%Y-%m").to_string();
        self.monthly(&month).await
    }

    /// 특정 월의 수익 리포트 조회.
    ///
    /// 기록이 없으면 `Ok(None)`을 반환합니다.
    pub async fn monthly(&self, month: &str) -> StoreResult<Option<MonthlyReport>> {
        let summaries = ProfitRepository::new(&self.db).monthly_summary(month).await?;
        if summaries.is_empty() {
            return Ok(None);
        }

        let total_profit_usdt = summaries.iter().map(|s| s.total_profit_usdt).sum();
        let total_trades = summaries.iter().map(|s| s.total_trades).sum();

        Ok(Some(MonthlyReport {
            month: month.to_string(),
            summaries,
            total_profit_usdt,
            total_trades,
        }))
    }

    /// 실시간 계좌 잔고 조회.
    ///
    /// 거래소 조회에 실패하면 경고를 남기고 `None`을 반환합니다.
    pub async fn live_balance(&self) -> Option<BalanceReport> {
        match self.client.get_account_balance().await {
            Ok(lines) => Some(BalanceReport {
                total_usdt: usdt_total(&lines),
                lines,
            }),
            Err(e) if e.is_auth_error() => {
                warn!(error = %e, "잔고 조회 실패: API 인증 정보를 확인하세요");
                None
            }
            Err(e) => {
                warn!(error = %e, "잔고 조회 실패");
                None
            }
        }
    }
}
