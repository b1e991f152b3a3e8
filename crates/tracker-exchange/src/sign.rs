//! OKX v5 API 요청 서명.
//!
//! OKX는 `timestamp + method + requestPath + body`를 이어 붙인 문자열을
//! HMAC-SHA256으로 서명한 뒤 base64로 인코딩한 값을 요구합니다.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 요청 서명을 생성합니다.
///
/// 동일한 입력에 대해 항상 동일한 서명을 반환하는 순수 함수입니다.
///
/// # Arguments
/// * `secret` - API 시크릿 키
/// * `timestamp` - ISO 8601 밀리초 타임스탬프 (예: "2020-12-08T09:08:57.715Z")
/// * `method` - HTTP 메서드 (대문자, 예: "GET")
/// * `request_path` - 쿼리 문자열을 포함한 요청 경로
/// * `body` - 요청 본문 (GET 요청은 빈 문자열)
pub fn sign(secret: &str, timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
    let payload = format!("{}{}{}{}", timestamp, method, request_path, body);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("Invalid key");
    mac.update(payload.as_bytes());

    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// 서명에 사용할 ISO 8601 타임스탬프를 생성합니다.
///
/// OKX가 요구하는 밀리초 정밀도 형식(`2020-12-08T09:08:57.715Z`)을 따릅니다.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
