//! 액세스 로그 파서
//!
//! 고정된 액세스 로그 문법의 한 라인을 [`LogEvent`]로 변환합니다.
//!
//! # 로그 라인 형식
//! ```text
//! 127.0.0.1 - frank [23/Mar/2019:18:44:53 +0000] "DELETE /config/update HTTP/1.0" 401 491
//! ```
//!
//! # 사용 예시
//! ```
//! use watchpost_monitor::parser::AccessLogParser;
//!
//! let parser = AccessLogParser::new();
//! let event = parser
//!     .parse_line(r#"127.0.0.1 - frank [23/Mar/2019:18:44:53 +0000] "GET /api/user HTTP/1.0" 200 123"#)
//!     .unwrap();
//! assert_eq!(event.section, "/api");
//! ```

use chrono::DateTime;
use regex::Regex;

use watchpost_core::error::{ParseError, WatchpostError};
use watchpost_core::pipeline::LogParser;
use watchpost_core::types::LogEvent;

/// 로그 라인 타임스탬프 형식: `23/Mar/2019:18:44:53 +0000`
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// 액세스 로그 라인 문법
///
/// `<host> - <user> [<timestamp>] "<method> <path> <protocol>" <status> <bytes>`
/// - host: 1~3자리 숫자 그룹의 dotted-quad
/// - path: `/`로 시작
/// - status: 정확히 3자리 숫자
const LINE_PATTERN: &str = r#"^(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}) - (.*) \[([^\]]+)\] "(\S+) (/\S*) (\S+)" (\d{3}) (\d+)$"#;

/// 액세스 로그 파서
///
/// core의 [`LogParser`] trait을 구현하며, 정규식은 생성 시 한 번만
/// 컴파일하여 재사용합니다. 부수 효과 없는 순수 변환입니다.
pub struct AccessLogParser {
    /// 컴파일된 라인 패턴
    line_pattern: Regex,
}

impl AccessLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self {
            // 패턴은 상수이므로 컴파일 실패는 불가능
            line_pattern: Regex::new(LINE_PATTERN).expect("access log pattern must compile"),
        }
    }

    /// 한 라인을 파싱합니다.
    ///
    /// 후행 개행 문자는 제거한 뒤 비교합니다. 제거 후 빈 라인은
    /// [`ParseError::EmptyInput`], 문법 불일치는 [`ParseError::Malformed`]로
    /// 실패하며 부분적으로 채워진 이벤트는 절대 반환하지 않습니다.
    pub fn parse_line(&self, line: &str) -> Result<LogEvent, ParseError> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);

        if line.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let caps = self
            .line_pattern
            .captures(line)
            .ok_or_else(|| ParseError::Malformed {
                reason: "line does not match access log grammar".to_owned(),
            })?;

        let timestamp_str = &caps[3];
        let timestamp = DateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT).map_err(
            |e| ParseError::Malformed {
                reason: format!("invalid timestamp '{timestamp_str}': {e}"),
            },
        )?;

        // 캡처 그룹이 숫자만 보장하므로 여기서 실패하면 (자릿수 초과 등)
        // 라인 전체를 실패 처리한다. 0으로 대체하지 않는다.
        let status_str = &caps[7];
        let status_code: u16 = status_str.parse().map_err(|_| ParseError::Malformed {
            reason: format!("invalid status code '{status_str}'"),
        })?;

        let bytes_str = &caps[8];
        let byte_size: u64 = bytes_str.parse().map_err(|_| ParseError::Malformed {
            reason: format!("invalid byte size '{bytes_str}'"),
        })?;

        let path = caps[5].to_owned();

        Ok(LogEvent {
            host: caps[1].to_owned(),
            user: caps[2].to_owned(),
            timestamp,
            method: caps[4].to_owned(),
            section: LogEvent::section_of(&path),
            path,
            status_code,
            byte_size,
            is_error: status_code >= 400,
        })
    }
}

impl Default for AccessLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for AccessLogParser {
    fn format_name(&self) -> &str {
        "access_log"
    }

    fn parse(&self, raw: &[u8]) -> Result<LogEvent, WatchpostError> {
        let line = String::from_utf8_lossy(raw);
        self.parse_line(&line).map_err(WatchpostError::from)
    }
}
