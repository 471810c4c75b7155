//! 에러 타입 -- 도메인별 에러 정의

/// Watchpost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum WatchpostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 라인 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
///
/// 잘못된 임계값/윈도우/경로는 시작 시점에 즉시 실패해야 합니다.
/// 부분 시작 모드는 없습니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 액세스 로그 라인 파싱 에러
///
/// 파싱 실패는 항상 라인 단위의 회복 가능한 에러입니다.
/// 실패한 라인은 버려질 뿐 스트림 전체를 중단시키지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 빈 입력 라인
    #[error("empty input line")]
    EmptyInput,

    /// 문법에 맞지 않는 라인
    #[error("malformed line: {reason}")]
    Malformed { reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 이미 실행 중인 파이프라인을 다시 시작함
    #[error("pipeline already running")]
    AlreadyRunning,

    /// 실행 중이 아닌 파이프라인을 정지함
    #[error("pipeline not running")]
    NotRunning,

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::Malformed {
            reason: "line does not match access log grammar".to_owned(),
        };
        assert!(err.to_string().contains("malformed line"));
        assert!(err.to_string().contains("grammar"));
    }

    #[test]
    fn empty_input_display() {
        assert_eq!(ParseError::EmptyInput.to_string(), "empty input line");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "monitor.alert_window_seconds".to_owned(),
            reason: "must be greater than 0".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("monitor.alert_window_seconds"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    fn wraps_into_watchpost_error() {
        let err: WatchpostError = ParseError::EmptyInput.into();
        assert!(matches!(err, WatchpostError::Parse(_)));

        let err: WatchpostError = PipelineError::AlreadyRunning.into();
        assert!(matches!(err, WatchpostError::Pipeline(_)));
    }

    #[test]
    fn file_not_found_display() {
        let err = ConfigError::FileNotFound {
            path: "/etc/watchpost/watchpost.toml".to_owned(),
        };
        assert!(err.to_string().contains("watchpost.toml"));
    }
}
