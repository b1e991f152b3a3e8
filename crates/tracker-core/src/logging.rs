//! tracing을 사용한 로깅 인프라.
//!
//! 이 모듈은 다양한 출력 형식을 지원하는 구조화된 로깅을 제공합니다:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 운영환경/로그 집계용 JSON 형식
//! - **compact**: 로그 크기를 줄이기 위한 간결한 형식

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식 (개발용)
    Pretty,
    /// 로그 집계용 JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// 로그 레벨 필터 (예: "info", "debug", "tracker_report=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_file: true,
            with_target: true,
        }
    }
}

impl LogOptions {
    /// 새 로깅 옵션을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 설정 파일의 `[logging]` 섹션에서 옵션을 생성합니다.
    ///
    /// 형식 문자열이 잘못된 경우 pretty로 대체합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// 주어진 옵션으로 로깅 시스템을 초기화합니다.
///
/// # 예제
///
/// ```no_run
/// use tracker_core::logging::{init_logging, LogFormat, LogOptions};
///
/// // 간단한 초기화
/// init_logging(LogOptions::default()).unwrap();
///
/// // 사용자 정의 옵션으로 초기화
/// let options = LogOptions::new("debug")
///     .with_format(LogFormat::Json);
/// init_logging(options).unwrap();
/// ```
pub fn init_logging(options: LogOptions) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&options.level))?;

    match options.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_file(options.with_file)
                .with_line_number(options.with_file)
                .with_target(options.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_file(options.with_file)
                .with_line_number(options.with_file)
                .with_target(options.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_file(options.with_file)
                .with_line_number(options.with_file)
                .with_target(options.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    tracing::info!(
        format = ?options.format,
        level = %options.level,
        "Logging initialized"
    );

    Ok(())
}

/// 설정 파일의 `[logging]` 섹션에서 로깅을 초기화합니다.
pub fn init_logging_from_settings(
    settings: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogOptions::from_settings(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("invalid".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_options_builder() {
        let options = LogOptions::new("debug").with_format(LogFormat::Json);

        assert_eq!(options.level, "debug");
        assert_eq!(options.format, LogFormat::Json);
        assert!(options.with_file);
    }

    #[test]
    fn test_log_options_from_settings() {
        let settings = LoggingConfig {
            level: "warn".to_string(),
            format: "compact".to_string(),
        };

        let options = LogOptions::from_settings(&settings);
        assert_eq!(options.level, "warn");
        assert_eq!(options.format, LogFormat::Compact);

        // 잘못된 형식은 pretty로 대체
        let settings = LoggingConfig {
            level: "info".to_string(),
            format: "fancy".to_string(),
        };
        assert_eq!(LogOptions::from_settings(&settings).format, LogFormat::Pretty);
    }
}
