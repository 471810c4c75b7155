//! 모니터 파이프라인 에러 타입
//!
//! [`MonitorError`]는 모니터 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<MonitorError> for WatchpostError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use watchpost_core::error::{ConfigError, ParseError, PipelineError, WatchpostError};

/// 모니터 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// 로그 라인 파싱 실패 (라인 단위, 회복 가능)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 수집기 에러 (파일 I/O 등)
    #[error("collector error: {source_type}: {reason}")]
    Collector {
        /// 수집 소스 유형 (file 등)
        source_type: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MonitorError> for WatchpostError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Parse(e) => WatchpostError::Parse(e),
            MonitorError::Config { field, reason } => {
                WatchpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            MonitorError::Io(e) => WatchpostError::Io(e),
            MonitorError::Channel(msg) => {
                WatchpostError::Pipeline(PipelineError::ChannelSend(msg))
            }
            other => {
                WatchpostError::Pipeline(PipelineError::InitFailed(other.to_string()))
            }
        }
    }
}
