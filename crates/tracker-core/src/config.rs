//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정 파일(`config/default.toml`)에서 로드한 뒤 `TRACKER__` 접두사의
//! 환경 변수로 오버라이드합니다.

use crate::types::{BotConfig, BotRegistry, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// OKX API 설정
    #[serde(default)]
    pub okx: ExchangeConfig,
    /// 텔레그램 봇 설정
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 수익 동기화 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 추적 대상 봇 목록 (이름 -> 설정)
    #[serde(default)]
    pub bots: HashMap<String, BotEntry>,
}

/// OKX API 접속 설정.
///
/// # 보안
/// - `Debug` 구현은 민감 정보(`api_key`, `secret_key`, `passphrase`)를 마스킹합니다.
#[derive(Clone, Deserialize, Serialize)]
pub struct ExchangeConfig {
    /// API 키
    #[serde(default)]
    pub api_key: String,
    /// API 시크릿
    #[serde(default)]
    pub secret_key: String,
    /// API 패스프레이즈
    #[serde(default)]
    pub passphrase: String,
    /// REST API 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.api_key.len() > 8 {
            format!(
                "{}...{}",
                &self.api_key[..4],
                &self.api_key[self.api_key.len() - 4..]
            )
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("ExchangeConfig")
            .field("api_key", &masked_key)
            .field("secret_key", &"***REDACTED***")
            .field("passphrase", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            passphrase: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.okx.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// 텔레그램 봇 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    #[serde(default)]
    pub bot_token: String,
    /// 허용된 사용자 ID 목록 (비어 있으면 전체 허용)
    #[serde(default)]
    pub allowed_user_ids: Vec<i64>,
    /// Long polling 대기 시간 (초)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            allowed_user_ids: Vec::new(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

fn default_poll_timeout() -> u64 {
    30
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite 데이터베이스 파일 경로
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "data/okx_tracker.db".to_string()
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// 수익 동기화 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// 동기화 실행 주기 (분 단위)
    #[serde(default = "default_sync_interval")]
    pub interval_minutes: u64,
    /// 체결 내역 조회 기간 (일 단위)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

impl SyncConfig {
    /// 동기화 실행 주기를 Duration으로 반환합니다.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_sync_interval(),
            lookback_days: default_lookback_days(),
        }
    }
}

fn default_sync_interval() -> u64 {
    60
}
fn default_lookback_days() -> i64 {
    1
}

/// 설정 파일의 봇 항목 (이름은 맵 키로 지정).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotEntry {
    /// 거래 심볼
    pub symbol: String,
    /// 매매 전략
    pub strategy: Strategy,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("database.path", default_db_path())?
            .set_default("okx.base_url", default_base_url())?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("TRACKER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 설정된 봇 목록으로 불변 레지스트리를 생성합니다.
    pub fn bot_registry(&self) -> BotRegistry {
        let bots = self
            .bots
            .iter()
            .map(|(name, entry)| BotConfig {
                name: name.clone(),
                symbol: entry.symbol.clone(),
                strategy: entry.strategy,
            })
            .collect();

        BotRegistry::new(bots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.okx.base_url, "https://www.okx.com");
        assert_eq!(config.okx.timeout_secs, 30);
        assert_eq!(config.sync.interval_minutes, 60);
        assert_eq!(config.sync.lookback_days, 1);
        assert!(config.telegram.allowed_user_ids.is_empty());
        assert!(config.bots.is_empty());
    }

    #[test]
    fn test_parse_from_toml() {
        let toml = r#"
            [okx]
            api_key = "test-key-12345678"
            secret_key = "test-secret"
            passphrase = "test-pass"

            [telegram]
            bot_token = "123:abc"
            allowed_user_ids = [123456789]

            [sync]
            interval_minutes = 15

            [bots.Bot-DCA-BTC]
            symbol = "BTC-USDT"
            strategy = "dca"

            [bots.Bot-Grid-ETH]
            symbol = "ETH-USDT"
            strategy = "grid"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.okx.api_key, "test-key-12345678");
        assert_eq!(config.telegram.allowed_user_ids, vec![123456789]);
        assert_eq!(config.sync.interval_minutes, 15);
        // 파일에 없는 값은 기본값 유지
        assert_eq!(config.sync.lookback_days, 1);
        assert_eq!(config.database.path, "data/okx_tracker.db");

        let registry = config.bot_registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Bot-DCA-BTC").unwrap().strategy, Strategy::Dca);
        assert_eq!(
            registry.get("Bot-Grid-ETH").unwrap().symbol,
            "ETH-USDT"
        );
    }

    #[test]
    fn test_env_override() {
        // 환경 변수 소스를 고정 맵으로 대체
        let vars = config::Map::from([
            (
                "TRACKER__OKX__API_KEY".to_string(),
                "env-key-12345678".to_string(),
            ),
            (
                "TRACKER__SYNC__INTERVAL_MINUTES".to_string(),
                "5".to_string(),
            ),
        ]);

        let config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("TRACKER")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.okx.api_key, "env-key-12345678");
        assert_eq!(config.sync.interval_minutes, 5);
        // 오버라이드되지 않은 값은 기본값 유지
        assert_eq!(config.okx.base_url, "https://www.okx.com");
    }

    #[test]
    fn test_exchange_config_debug_masks_secrets() {
        let config = ExchangeConfig {
            api_key: "abcdefgh12345678".to_string(),
            secret_key: "very-secret".to_string(),
            passphrase: "hunter2".to_string(),
            ..Default::default()
        };

        let debug = format!("{:?}", config);
        assert!(debug.contains("abcd...5678"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_sync_interval_duration() {
        let sync = SyncConfig {
            interval_minutes: 15,
            lookback_days: 1,
        };
        assert_eq!(sync.interval(), Duration::from_secs(900));
    }
}
