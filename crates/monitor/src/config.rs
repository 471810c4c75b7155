//! 모니터 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`MonitorConfig`](watchpost_core::config::MonitorConfig)를
//! 기반으로 파이프라인 런타임 설정을 제공합니다.
//!
//! # 사용 예시
//! ```
//! use watchpost_core::config::WatchpostConfig;
//! use watchpost_monitor::config::PipelineConfig;
//!
//! let core_config = WatchpostConfig::default();
//! let config = PipelineConfig::from_core(&core_config.monitor);
//! assert_eq!(config.alert_rate_threshold, 10);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// 모니터 파이프라인 설정
///
/// core의 `MonitorConfig`에서 파생됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
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

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_core(&watchpost_core::config::MonitorConfig::default())
    }
}

impl PipelineConfig {
    /// core의 `MonitorConfig`에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &watchpost_core::config::MonitorConfig) -> Self {
        Self {
            log_file_path: core.log_file_path.clone(),
            alert_rate_threshold: core.alert_rate_threshold,
            alert_window_seconds: core.alert_window_seconds,
            stats_window_seconds: core.stats_window_seconds,
            refresh_interval_ms: core.refresh_interval_ms,
            poll_interval_ms: core.poll_interval_ms,
            read_existing: core.read_existing,
            channel_capacity: core.channel_capacity,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 윈도우나 임계값이 0이면 비율 계산이 정의되지 않으므로
    /// 시작 전에 즉시 실패합니다.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.log_file_path.is_empty() {
            return Err(MonitorError::Config {
                field: "log_file_path".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.alert_rate_threshold == 0 {
            return Err(MonitorError::Config {
                field: "alert_rate_threshold".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.alert_window_seconds == 0 {
            return Err(MonitorError::Config {
                field: "alert_window_seconds".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.stats_window_seconds == 0 {
            return Err(MonitorError::Config {
                field: "stats_window_seconds".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.refresh_interval_ms == 0 {
            return Err(MonitorError::Config {
                field: "refresh_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(MonitorError::Config {
                field: "poll_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.channel_capacity == 0 {
            return Err(MonitorError::Config {
                field: "channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 감시할 로그 파일 경로를 설정합니다.
    pub fn log_file_path(mut self, path: impl Into<String>) -> Self {
        self.config.log_file_path = path.into();
        self
    }

    /// 알림 임계값(초당 요청 수)을 설정합니다.
    pub fn alert_rate_threshold(mut self, threshold: u32) -> Self {
        self.config.alert_rate_threshold = threshold;
        self
    }

    /// 알림 판정 윈도우(초)를 설정합니다.
    pub fn alert_window_seconds(mut self, seconds: u64) -> Self {
        self.config.alert_window_seconds = seconds;
        self
    }

    /// 라이브 통계 윈도우(초)를 설정합니다.
    pub fn stats_window_seconds(mut self, seconds: u64) -> Self {
        self.config.stats_window_seconds = seconds;
        self
    }

    /// 평가 tick 주기(밀리초)를 설정합니다.
    pub fn refresh_interval_ms(mut self, millis: u64) -> Self {
        self.config.refresh_interval_ms = millis;
        self
    }

    /// 파일 폴링 주기(밀리초)를 설정합니다.
    pub fn poll_interval_ms(mut self, millis: u64) -> Self {
        self.config.poll_interval_ms = millis;
        self
    }

    /// 시작 시 기존 파일 내용을 읽을지 여부를 설정합니다.
    pub fn read_existing(mut self, read_existing: bool) -> Self {
        self.config.read_existing = read_existing;
        self
    }

    /// 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, MonitorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = watchpost_core::config::MonitorConfig {
            log_file_path: "/var/log/nginx/access.log".to_owned(),
            alert_rate_threshold: 25,
            alert_window_seconds: 60,
            ..Default::default()
        };
        let config = PipelineConfig::from_core(&core);
        assert_eq!(config.log_file_path, "/var/log/nginx/access.log");
        assert_eq!(config.alert_rate_threshold, 25);
        assert_eq!(config.alert_window_seconds, 60);
        // 나머지는 core 기본값
        assert_eq!(config.stats_window_seconds, 10);
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let config = PipelineConfig {
            alert_rate_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_window() {
        let config = PipelineConfig {
            alert_window_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_path() {
        let config = PipelineConfig {
            log_file_path: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = PipelineConfigBuilder::new()
            .log_file_path("/tmp/test.log")
            .alert_rate_threshold(5)
            .alert_window_seconds(30)
            .build()
            .unwrap();
        assert_eq!(config.log_file_path, "/tmp/test.log");
        assert_eq!(config.alert_rate_threshold, 5);
        assert_eq!(config.alert_window_seconds, 30);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = PipelineConfigBuilder::new().alert_window_seconds(0).build();
        assert!(result.is_err());
    }
}
