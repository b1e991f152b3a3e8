//! OKX 거래소 클라이언트.
//!
//! OKX v5 REST API의 인증 요청 구현.
//! 계좌 잔고와 체결 내역 조회를 지원합니다.

#![allow(dead_code)] // API 응답 필드 전체 매핑 (일부만 사용)

use crate::error::{ExchangeError, ExchangeResult};
use crate::sign;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, error};
use tracker_core::{BalanceLine, Fill};

// ============================================================================
// 설정
// ============================================================================

/// OKX 클라이언트 설정.
///
/// # 보안
/// - `Debug` 구현은 민감 정보(`api_key`, `secret_key`, `passphrase`)를 마스킹합니다.
#[derive(Clone)]
pub struct OkxConfig {
    /// API 키
    pub api_key: String,
    /// API 시크릿
    pub secret_key: String,
    /// API 패스프레이즈
    pub passphrase: String,
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl fmt::Debug for OkxConfig {
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

        f.debug_struct("OkxConfig")
            .field("api_key", &masked_key)
            .field("secret_key", &"***REDACTED***")
            .field("passphrase", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OkxConfig {
    /// 새 설정 생성.
    pub fn new(api_key: String, secret_key: String, passphrase: String) -> Self {
        Self {
            api_key,
            secret_key,
            passphrase,
            base_url: "https://www.okx.com".to_string(),
            timeout_secs: 30,
        }
    }

    /// 기본 URL 변경.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 요청 타임아웃 변경.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

/// OKX 공통 응답 래퍼.
///
/// 모든 v5 엔드포인트는 `{"code": "0", "msg": "", "data": [...]}` 형태로
/// 응답하며 `code`가 문자열 "0"일 때만 성공입니다.
#[derive(Debug, Deserialize)]
struct OkxResponse<T> {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OkxBalance {
    details: Vec<OkxBalanceDetail>,
    #[serde(default)]
    total_eq: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OkxBalanceDetail {
    ccy: String,
    cash_bal: String,
    #[serde(default)]
    avail_bal: String,
    #[serde(default)]
    frozen_bal: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OkxFill {
    #[serde(default)]
    inst_type: String,
    inst_id: String,
    trade_id: String,
    ord_id: String,
    #[serde(default)]
    bill_id: String,
    side: String,
    fill_px: String,
    fill_sz: String,
    #[serde(default)]
    fill_pnl: String,
    #[serde(default)]
    fee: String,
    #[serde(default)]
    fee_ccy: String,
    #[serde(default)]
    exec_type: String,
    ts: String,
}

impl OkxFill {
    /// API 응답을 도메인 체결 모델로 변환.
    fn into_fill(self) -> Fill {
        let ts_ms = self.ts.parse::<i64>().unwrap_or(0);
        let ts = DateTime::from_timestamp_millis(ts_ms).unwrap_or_else(Utc::now);

        Fill {
            inst_id: self.inst_id,
            trade_id: self.trade_id,
            order_id: self.ord_id,
            side: self.side,
            fill_px: parse_decimal(&self.fill_px),
            fill_sz: parse_decimal(&self.fill_sz),
            fill_pnl: parse_decimal(&self.fill_pnl),
            fee: parse_decimal(&self.fee),
            fee_ccy: self.fee_ccy,
            ts,
        }
    }
}

// ============================================================================
// OKX 클라이언트
// ============================================================================

/// OKX 거래소 클라이언트.
#[derive(Clone)]
pub struct OkxClient {
    config: OkxConfig,
    client: Client,
}

impl OkxClient {
    /// 새 OKX 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: OkxConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// 파라미터에서 쿼리 문자열 생성.
    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 서명된 GET 요청.
    ///
    /// 쿼리 문자열은 요청 경로에 포함된 상태로 서명됩니다.
    async fn signed_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<Vec<T>> {
        let query = Self::build_query(params);
        let request_path = if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query)
        };

        let timestamp = sign::iso_timestamp(Utc::now());
        let signature = sign::sign(
            &self.config.secret_key,
            &timestamp,
            "GET",
            &request_path,
            "",
        );
        let url = format!("{}{}", self.config.base_url, request_path);

        debug!("GET (signed) {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header("OK-ACCESS-KEY", &self.config.api_key)
            .header("OK-ACCESS-SIGN", &signature)
            .header("OK-ACCESS-TIMESTAMP", &timestamp)
            .header("OK-ACCESS-PASSPHRASE", &self.config.passphrase)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// API 응답 처리.
    ///
    /// HTTP 상태와 무관하게 OKX 응답 래퍼 파싱을 먼저 시도합니다.
    /// OKX는 일부 인증 실패를 4xx 상태와 에러 코드 본문으로 함께 반환합니다.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> ExchangeResult<Vec<T>> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        let envelope: OkxResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                if status.is_success() {
                    error!("Failed to parse response: {} - Body: {}", e, body);
                    return Err(ExchangeError::ParseError(e.to_string()));
                }
                return Err(ExchangeError::ApiError {
                    code: status.as_u16().to_string(),
                    message: body,
                });
            }
        };

        if envelope.code != "0" {
            return Err(Self::map_error_code(&envelope.code, &envelope.msg));
        }

        Ok(envelope.data)
    }

    /// OKX 에러 코드를 ExchangeError로 매핑.
    ///
    /// - 50011: 요청 한도 초과
    /// - 50102: 타임스탬프 만료
    /// - 50105: 패스프레이즈 불일치
    /// - 50111: 유효하지 않은 API 키
    /// - 50113: 유효하지 않은 서명
    /// - 50114: 유효하지 않은 권한
    fn map_error_code(code: &str, msg: &str) -> ExchangeError {
        match code {
            "50011" => ExchangeError::RateLimited,
            "50102" | "50105" | "50111" | "50113" | "50114" => {
                ExchangeError::Unauthorized(msg.to_string())
            }
            _ => ExchangeError::ApiError {
                code: code.to_string(),
                message: msg.to_string(),
            },
        }
    }

    /// 계좌 잔고 조회.
    ///
    /// 잔고가 0보다 큰 통화만 반환합니다.
    pub async fn get_account_balance(&self) -> ExchangeResult<Vec<BalanceLine>> {
        let accounts: Vec<OkxBalance> = self.signed_get("/api/v5/account/balance", &[]).await?;

        let account = accounts
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::ParseError("잔고 응답이 비어 있습니다".to_string()))?;

        let mut lines = Vec::new();
        for detail in account.details {
            let amount = parse_decimal(&detail.cash_bal);
            if amount > Decimal::ZERO {
                lines.push(BalanceLine {
                    currency: detail.ccy,
                    amount,
                });
            }
        }

        debug!("잔고 조회 완료: {}개 통화", lines.len());
        Ok(lines)
    }

    /// 체결 내역 조회.
    ///
    /// 최근 `lookback_days`일 동안의 체결을 조회합니다.
    /// 체결이 없는 기간은 빈 목록을 반환합니다.
    pub async fn get_trading_history(
        &self,
        inst_id: &str,
        lookback_days: i64,
    ) -> ExchangeResult<Vec<Fill>> {
        let end = Utc::now();
        let start = end - Duration::days(lookback_days);

        let params = [
            ("instId", inst_id.to_string()),
            ("after", start.timestamp_millis().to_string()),
            ("before", end.timestamp_millis().to_string()),
        ];

        let fills: Vec<OkxFill> = self
            .signed_get("/api/v5/trade/fills-history", &params)
            .await?;

        debug!(inst_id = %inst_id, fills = fills.len(), "체결 내역 조회 완료");
        Ok(fills.into_iter().map(OkxFill::into_fill).collect())
    }
}

/// 문자열을 Decimal로 파싱 (실패 시 0).
fn parse_decimal(s: &str) -> Decimal {
    s.parse().unwrap_or(Decimal::ZERO)
}
