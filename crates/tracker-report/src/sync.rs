//! 일일 수익 동기화 파이프라인.
//!
//! 봇별 체결 내역을 거래소에서 조회해 당일 수익 기록으로 변환하고
//! (날짜, 봇 이름) 기준으로 저장합니다.
//!
//! 봇 단위로 격리되어 한 봇의 조회 실패가 다른 봇의 동기화를 막지 않습니다.
//! 실패한 봇은 재시도 없이 다음 주기로 넘어갑니다.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracker_core::{BotConfig, BotRegistry, DailyProfitRecord, Fill};
use tracker_exchange::OkxClient;
use tracker_store::{Database, ProfitRepository, StoreResult};

/// 동기화 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// 총 봇 수
    pub total: usize,
    /// 성공 횟수 (기록 저장됨)
    pub success: usize,
    /// 빈 데이터 (조회 성공, 체결 없음)
    pub empty: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 처리된 총 체결 수
    pub total_fills: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            empty = self.empty,
            errors = self.errors,
            total_fills = self.total_fills,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}

/// 일일 수익 동기화 작업.
pub struct ProfitSync {
    db: Database,
    client: OkxClient,
    registry: BotRegistry,
    lookback_days: i64,
}

impl ProfitSync {
    /// 새 동기화 작업 생성.
    pub fn new(db: Database, client: OkxClient, registry: BotRegistry, lookback_days: i64) -> Self {
        Self {
            db,
            client,
            registry,
            lookback_days,
        }
    }

    /// 모든 봇에 대해 한 번의 동기화를 수행합니다.
    ///
    /// 거래소 조회에 실패한 봇은 건너뛰고 다음 봇을 계속 처리합니다.
    /// 저장소 쓰기 실패는 즉시 반환됩니다.
    pub async fn run_once(&self) -> StoreResult<SyncStats> {
        let started = Instant::now();
        let mut stats = SyncStats::new();
        let today = Utc::now().date_naive();
        let repo = ProfitRepository::new(&self.db);

        for bot in self.registry.iter() {
            stats.total += 1;

            let fills = match self
                .client
                .get_trading_history(&bot.symbol, self.lookback_days)
                .await
            {
                Ok(fills) => fills,
                Err(e) => {
                    warn!(
                        bot = %bot.name,
                        error = %e,
                        retryable = e.is_retryable(),
                        "체결 내역 조회 실패, 다음 주기에 다시 시도"
                    );
                    stats.errors += 1;
                    continue;
                }
            };

            if fills.is_empty() {
                debug!(bot = %bot.name, "체결 내역 없음");
                stats.empty += 1;
                continue;
            }

            let record = Self::build_record(bot, &fills, today);
            repo.upsert_daily(&record).await?;

            stats.success += 1;
            stats.total_fills += fills.len();
        }

        stats.elapsed = started.elapsed();
        Ok(stats)
    }

    /// 체결 목록을 일일 수익 기록으로 집계합니다.
    ///
    /// - 수익 = 실현 손익 합계 + USDT 수수료 합계 (수수료는 음수)
    /// - 수익률 = 수익 / 체결 명목 금액 합계 × 100 (명목 금액이 0이면 0)
    fn build_record(bot: &BotConfig, fills: &[Fill], date: NaiveDate) -> DailyProfitRecord {
        let realized: Decimal = fills.iter().map(|f| f.fill_pnl).sum();
        let fees: Decimal = fills
            .iter()
            .filter(|f| f.fee_ccy == "USDT")
            .map(|f| f.fee)
            .sum();
        let profit = realized + fees;

        let notional: Decimal = fills.iter().map(Fill::notional).sum();
        let percentage = if notional > Decimal::ZERO {
            profit / notional * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        DailyProfitRecord::new(
            date,
            bot.name.clone(),
            bot.symbol.clone(),
            profit,
            percentage,
            fills.len() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tracker_core::Strategy;
    use tracker_exchange::OkxConfig;

    fn bot(name: &str, symbol: &str) -> BotConfig {
        BotConfig {
            name: name.to_string(),
            symbol: symbol.to_string(),
            strategy: Strategy::Dca,
        }
    }

    fn fill(pnl: Decimal, fee: Decimal, fee_ccy: &str, px: Decimal, sz: Decimal) -> Fill {
        Fill {
            inst_id: "BTC-USDT".to_string(),
            trade_id: "1".to_string(),
            order_id: "1".to_string(),
            side: "sell".to_string(),
            fill_px: px,
            fill_sz: sz,
            fill_pnl: pnl,
            fee,
            fee_ccy: fee_ccy.to_string(),
            ts: Utc::now(),
        }
    }

    fn test_client(base_url: &str) -> OkxClient {
        let config = OkxConfig::new(
            "test-key".to_string(),
            "test-secret".to_string(),
            "test-pass".to_string(),
        )
        .with_base_url(base_url);
        OkxClient::new(config).expect("테스트용 클라이언트 생성 실패")
    }

    #[test]
    fn test_build_record_sums_pnl_and_usdt_fees() {
        let fills = vec![
            fill(dec!(10), dec!(-0.5), "USDT", dec!(100), dec!(1)),
            fill(dec!(-2), dec!(-0.001), "BTC", dec!(200), dec!(0.5)),
        ];

        let record =
            ProfitSync::build_record(&bot("Bot-DCA-BTC", "BTC-USDT"), &fills, date(2024, 3, 15));

        // 수익 = 10 - 2 - 0.5 (BTC 수수료는 제외)
        assert_eq!(record.profit_usdt, dec!(7.5));
        // 명목 금액 = 100 + 100, 수익률 = 7.5 / 200 * 100
        assert_eq!(record.profit_percentage, dec!(3.75));
        assert_eq!(record.trades_count, 2);
        assert_eq!(record.bot_name, "Bot-DCA-BTC");
        assert_eq!(record.symbol, "BTC-USDT");
    }

    #[test]
    fn test_build_record_zero_notional() {
        let fills = vec![fill(dec!(1), dec!(0), "USDT", dec!(0), dec!(0))];

        let record =
            ProfitSync::build_record(&bot("Bot-DCA-BTC", "BTC-USDT"), &fills, date(2024, 3, 15));

        assert_eq!(record.profit_usdt, dec!(1));
        assert_eq!(record.profit_percentage, Decimal::ZERO);
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_run_once_stores_record() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/api/v5/trade/fills-history")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"code":"0","msg":"","data":[{
                    "instId":"BTC-USDT","tradeId":"123","ordId":"456","side":"sell",
                    "fillPx":"65000.5","fillSz":"0.01","fillPnl":"12.5",
                    "fee":"-0.65","feeCcy":"USDT","ts":"1710420000000"
                }]}"#,
            )
            .create_async()
            .await;

        let db = Database::in_memory().await.unwrap();
        let registry = BotRegistry::new(vec![bot("Bot-DCA-BTC", "BTC-USDT")]);
        let sync = ProfitSync::new(db.clone(), test_client(&server.url()), registry, 1);

        let stats = sync.run_once().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.total_fills, 1);

        let rows = ProfitRepository::new(&db)
            .daily_summary(Utc::now().date_naive())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].profit_usdt, dec!(11.85));
        assert_eq!(rows[0].trades_count, 1);
    }

    #[tokio::test]
    async fn test_run_once_empty_fills_writes_nothing() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/api/v5/trade/fills-history")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[]}"#)
            .create_async()
            .await;

        let db = Database::in_memory().await.unwrap();
        let registry = BotRegistry::new(vec![bot("Bot-DCA-BTC", "BTC-USDT")]);
        let sync = ProfitSync::new(db.clone(), test_client(&server.url()), registry, 1);

        let stats = sync.run_once().await.unwrap();
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.success, 0);

        let rows = ProfitRepository::new(&db)
            .daily_summary(Utc::now().date_naive())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_run_once_isolates_failures() {
        let mut server = mockito::Server::new_async().await;

        // 모든 조회가 실패해도 run_once 자체는 성공해야 함
        let _mock = server
            .mock("GET", "/api/v5/trade/fills-history")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let db = Database::in_memory().await.unwrap();
        let registry = BotRegistry::new(vec![
            bot("Bot-DCA-BTC", "BTC-USDT"),
            bot("Bot-Grid-ETH", "ETH-USDT"),
        ]);
        let sync = ProfitSync::new(db.clone(), test_client(&server.url()), registry, 1);

        let stats = sync.run_once().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.success, 0);
    }
}
