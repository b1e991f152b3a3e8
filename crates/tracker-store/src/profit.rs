//! 일일 수익 저장소.

use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::Row;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;
use tracker_core::{DailyProfitRecord, MonthlyBotSummary};

/// 일일 수익 기록 저장소.
pub struct ProfitRepository<'a> {
    db: &'a Database,
}

impl<'a> ProfitRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ========================================================================
    // 쓰기
    // ========================================================================

    /// 일일 수익 기록을 저장합니다.
    ///
    /// 같은 (날짜, 봇 이름) 조합이 이미 있으면 기존 행을 덮어씁니다.
    /// 하루를 여러 번 동기화해도 봇당 하루 한 행만 유지됩니다.
    pub async fn upsert_daily(&self, record: &DailyProfitRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_profits (
                date, bot_name, symbol, profit_usdt, profit_percentage,
                trades_count, recorded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(date, bot_name) DO UPDATE SET
                symbol = excluded.symbol,
                profit_usdt = excluded.profit_usdt,
                profit_percentage = excluded.profit_percentage,
                trades_count = excluded.trades_count,
                recorded_at = excluded.recorded_at
            "#,
        )
        .bind(record.date)
        .bind(&record.bot_name)
        .bind(&record.symbol)
        .bind(record.profit_usdt.to_string())
        .bind(record.profit_percentage.to_string())
        .bind(record.trades_count)
        .bind(record.recorded_at)
        .execute(self.db.pool())
        .await?;

        debug!(bot = %record.bot_name, date = %record.date, "일일 수익 기록 저장");
        Ok(())
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 특정 날짜의 봇별 수익 기록을 조회합니다.
    ///
    /// 기록이 없으면 빈 목록을 반환합니다.
    pub async fn daily_summary(&self, date: NaiveDate) -> StoreResult<Vec<DailyProfitRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM daily_profits WHERE date = ? ORDER BY bot_name",
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// 특정 월의 봇별 수익 요약을 조회합니다.
    ///
    /// # Arguments
    /// * `month` - "YYYY-MM" 형식의 월 (예: "2024-03")
    ///
    /// # Errors
    /// 월 형식이 잘못되면 `StoreError::InvalidData`를 반환합니다.
    pub async fn monthly_summary(&self, month: &str) -> StoreResult<Vec<MonthlyBotSummary>> {
        Self::validate_month(month)?;

        let rows = sqlx::query(
            "SELECT * FROM daily_profits WHERE date LIKE ? ORDER BY bot_name, date",
        )
        .bind(format!("{}%", month))
        .fetch_all(self.db.pool())
        .await?;

        // 봇별 집계: (총 수익, 수익률 합, 체결 수, 기록된 일수)
        let mut by_bot: BTreeMap<String, (Decimal, Decimal, u32, u32)> = BTreeMap::new();
        for row in &rows {
            let record = Self::row_to_record(row)?;
            let entry = by_bot
                .entry(record.bot_name)
                .or_insert((Decimal::ZERO, Decimal::ZERO, 0, 0));
            entry.0 += record.profit_usdt;
            entry.1 += record.profit_percentage;
            entry.2 += record.trades_count;
            entry.3 += 1;
        }

        let summaries = by_bot
            .into_iter()
            .map(|(bot_name, (total, pct_sum, trades, days))| MonthlyBotSummary {
                bot_name,
                total_profit_usdt: total,
                avg_profit_percentage: pct_sum / Decimal::from(days),
                total_trades: trades,
                active_days: days,
            })
            .collect();

        Ok(summaries)
    }

    // ========================================================================
    // 내부 헬퍼
    // ========================================================================

    /// "YYYY-MM" 형식 검증.
    fn validate_month(month: &str) -> StoreResult<()> {
        let bytes = month.as_bytes();
        let valid = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());

        if !valid {
            return Err(StoreError::InvalidData(format!(
                "잘못된 월 형식입니다 (YYYY-MM): {}",
                month
            )));
        }
        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> StoreResult<DailyProfitRecord> {
        Ok(DailyProfitRecord {
            date: row.get("date"),
            bot_name: row.get("bot_name"),
            symbol: row.get("symbol"),
            profit_usdt: Decimal::from_str(row.get::<&str, _>("profit_usdt"))
                .unwrap_or(Decimal::ZERO),
            profit_percentage: Decimal::from_str(row.get::<&str, _>("profit_percentage"))
                .unwrap_or(Decimal::ZERO),
            trades_count: row.get("trades_count"),
            recorded_at: row.get("recorded_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        date: NaiveDate,
        bot: &str,
        profit: Decimal,
        pct: Decimal,
        trades: u32,
    ) -> DailyProfitRecord {
        DailyProfitRecord::new(date, bot, "BTC-USDT", profit, pct, trades)
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);
        let d = date(2024, 3, 15);

        let r = record(d, "Bot-DCA-BTC", dec!(10), dec!(1.0), 5);
        repo.upsert_daily(&r).await.unwrap();
        repo.upsert_daily(&r).await.unwrap();

        let rows = repo.daily_summary(d).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].profit_usdt, dec!(10));
        assert_eq!(rows[0].trades_count, 5);
    }

    #[tokio::test]
    async fn test_upsert_last_writer_wins() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);
        let d = date(2024, 3, 15);

        repo.upsert_daily(&record(d, "Bot-DCA-BTC", dec!(10), dec!(1.0), 5))
            .await
            .unwrap();
        repo.upsert_daily(&record(d, "Bot-DCA-BTC", dec!(-3.5), dec!(-0.35), 8))
            .await
            .unwrap();

        let rows = repo.daily_summary(d).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].profit_usdt, dec!(-3.5));
        assert_eq!(rows[0].profit_percentage, dec!(-0.35));
        assert_eq!(rows[0].trades_count, 8);
    }

    #[tokio::test]
    async fn test_daily_summary_ordered_by_bot_name() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);
        let d = date(2024, 3, 15);

        repo.upsert_daily(&record(d, "Bot-Grid-ETH", dec!(-5), dec!(-0.5), 3))
            .await
            .unwrap();
        repo.upsert_daily(&record(d, "Bot-DCA-BTC", dec!(10), dec!(1.0), 5))
            .await
            .unwrap();
        repo.upsert_daily(&record(d, "Bot-Martingale-BNB", dec!(0), dec!(0), 0))
            .await
            .unwrap();

        let rows = repo.daily_summary(d).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.bot_name.as_str()).collect();
        assert_eq!(names, vec!["Bot-DCA-BTC", "Bot-Grid-ETH", "Bot-Martingale-BNB"]);
    }

    #[tokio::test]
    async fn test_daily_summary_empty_date() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);

        let rows = repo.daily_summary(date(2024, 3, 15)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_summary_aggregates_per_bot() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);

        // 3일간: 수익 {10, -5, 0}, 수익률 {1.0, -0.5, 0.0}
        repo.upsert_daily(&record(date(2024, 3, 1), "Bot-DCA-BTC", dec!(10), dec!(1.0), 5))
            .await
            .unwrap();
        repo.upsert_daily(&record(date(2024, 3, 2), "Bot-DCA-BTC", dec!(-5), dec!(-0.5), 3))
            .await
            .unwrap();
        repo.upsert_daily(&record(date(2024, 3, 3), "Bot-DCA-BTC", dec!(0), dec!(0.0), 0))
            .await
            .unwrap();

        let summaries = repo.monthly_summary("2024-03").await.unwrap();
        assert_eq!(summaries.len(), 1);

        let s = &summaries[0];
        assert_eq!(s.bot_name, "Bot-DCA-BTC");
        assert_eq!(s.total_profit_usdt, dec!(5));
        assert_eq!(s.avg_profit_percentage.round_dp(4), dec!(0.1667));
        assert_eq!(s.total_trades, 8);
        assert_eq!(s.active_days, 3);
    }

    #[tokio::test]
    async fn test_monthly_summary_groups_by_bot() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);

        // Bot-DCA-BTC 2일, Bot-Grid-ETH 1일이 같은 달에 섞여 있음
        repo.upsert_daily(&record(date(2024, 3, 1), "Bot-DCA-BTC", dec!(10), dec!(1.0), 5))
            .await
            .unwrap();
        repo.upsert_daily(&record(date(2024, 3, 2), "Bot-DCA-BTC", dec!(-5), dec!(-0.5), 3))
            .await
            .unwrap();
        repo.upsert_daily(&record(date(2024, 3, 1), "Bot-Grid-ETH", dec!(2), dec!(0.2), 7))
            .await
            .unwrap();

        let summaries = repo.monthly_summary("2024-03").await.unwrap();
        assert_eq!(summaries.len(), 2);

        let names: Vec<&str> = summaries.iter().map(|s| s.bot_name.as_str()).collect();
        assert_eq!(names, vec!["Bot-DCA-BTC", "Bot-Grid-ETH"]);

        let dca = &summaries[0];
        assert_eq!(dca.total_profit_usdt, dec!(5));
        assert_eq!(dca.avg_profit_percentage, dec!(0.25));
        assert_eq!(dca.total_trades, 8);
        assert_eq!(dca.active_days, 2);

        let grid = &summaries[1];
        assert_eq!(grid.total_profit_usdt, dec!(2));
        assert_eq!(grid.avg_profit_percentage, dec!(0.2));
        assert_eq!(grid.total_trades, 7);
        assert_eq!(grid.active_days, 1);
    }

    #[tokio::test]
    async fn test_monthly_summary_isolates_months() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);

        repo.upsert_daily(&record(date(2024, 3, 31), "Bot-DCA-BTC", dec!(10), dec!(1.0), 5))
            .await
            .unwrap();
        repo.upsert_daily(&record(date(2024, 4, 1), "Bot-DCA-BTC", dec!(99), dec!(9.9), 9))
            .await
            .unwrap();

        let summaries = repo.monthly_summary("2024-03").await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_profit_usdt, dec!(10));
        assert_eq!(summaries[0].active_days, 1);
    }

    #[tokio::test]
    async fn test_monthly_summary_empty_month() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);

        let summaries = repo.monthly_summary("2024-03").await.unwrap();
        assert!(summaries.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_summary_rejects_bad_format() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProfitRepository::new(&db);

        for bad in ["2024/03", "202403", "24-03", "2024-3", ""] {
            let err = repo.monthly_summary(bad).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidData(_)), "{}", bad);
        }
    }
}
