//! 설정 관리 -- watchpost.toml 파싱 및 런타임 설정
//!
//! [`WatchpostConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD=20` 형식)
//! 3. 설정 파일 (`watchpost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), watchpost_core::error::WatchpostError> {
//! use watchpost_core::config::WatchpostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = WatchpostConfig::load("watchpost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = WatchpostConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, WatchpostError};

/// Watchpost 통합 설정
///
/// `watchpost.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchpostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 모니터 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl WatchpostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, WatchpostError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, WatchpostError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WatchpostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                WatchpostError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, WatchpostError> {
        toml::from_str(toml_str).map_err(|e| {
            WatchpostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `WATCHPOST_{SECTION}_{FIELD}`
    /// 예: `WATCHPOST_MONITOR_LOG_FILE_PATH=/var/log/nginx/access.log`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "WATCHPOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "WATCHPOST_GENERAL_LOG_FORMAT");

        // Monitor
        override_string(
            &mut self.monitor.log_file_path,
            "WATCHPOST_MONITOR_LOG_FILE_PATH",
        );
        override_u32(
            &mut self.monitor.alert_rate_threshold,
            "WATCHPOST_MONITOR_ALERT_RATE_THRESHOLD",
        );
        override_u64(
            &mut self.monitor.alert_window_seconds,
            "WATCHPOST_MONITOR_ALERT_WINDOW_SECONDS",
        );
        override_u64(
            &mut self.monitor.stats_window_seconds,
            "WATCHPOST_MONITOR_STATS_WINDOW_SECONDS",
        );
        override_u64(
            &mut self.monitor.refresh_interval_ms,
            "WATCHPOST_MONITOR_REFRESH_INTERVAL_MS",
        );
        override_u64(
            &mut self.monitor.poll_interval_ms,
            "WATCHPOST_MONITOR_POLL_INTERVAL_MS",
        );
        override_bool(
            &mut self.monitor.read_existing,
            "WATCHPOST_MONITOR_READ_EXISTING",
        );
        override_usize(
            &mut self.monitor.channel_capacity,
            "WATCHPOST_MONITOR_CHANNEL_CAPACITY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 윈도우/임계값이 0이면 비율 계산이 정의되지 않으므로
    /// 시작 시점에 즉시 실패합니다.
    pub fn validate(&self) -> Result<(), WatchpostError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.monitor.log_file_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.log_file_path".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.monitor.alert_rate_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.alert_rate_threshold".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.monitor.alert_window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.alert_window_seconds".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.monitor.stats_window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.stats_window_seconds".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        const MAX_REFRESH_INTERVAL_MS: u64 = 60_000; // 1 minute
        if self.monitor.refresh_interval_ms == 0
            || self.monitor.refresh_interval_ms > MAX_REFRESH_INTERVAL_MS
        {
            return Err(ConfigError::InvalidValue {
                field: "monitor.refresh_interval_ms".to_owned(),
                reason: format!("must be 1-{}", MAX_REFRESH_INTERVAL_MS),
            }
            .into());
        }

        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.poll_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.monitor.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 모니터 설정
///
/// 감시 대상 파일과 알림 임계값, 각 주기를 정의합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 감시할 액세스 로그 파일 경로
    pub log_file_path: String,
    /// 알림 임계값 (초당 요청 수)
    pub alert_rate_threshold: u32,
    /// 알림 판정 윈도우 (초)
    pub alert_window_seconds: u64,
    /// 라이브 통계 윈도우 (초)
    pub stats_window_seconds: u64,
    /// 평가 tick 주기 (밀리초)
    pub refresh_interval_ms: u64,
    /// 파일 폴링 주기 (밀리초)
    pub poll_interval_ms: u64,
    /// 시작 시 기존 파일 내용을 읽을지 여부
    pub read_existing: bool,
    /// 수집기 -> 파이프라인 채널 용량
    pub channel_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_file_path: "/tmp/access.log".to_owned(),
            alert_rate_threshold: 10,
            alert_window_seconds: 120,
            stats_window_seconds: 10,
            refresh_interval_ms: 500,
            poll_interval_ms: 250,
            read_existing: true,
            channel_capacity: 1024,
        }
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
