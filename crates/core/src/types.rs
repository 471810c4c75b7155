//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 파싱된 액세스 로그 이벤트와 섹션별 집계 결과, 알림 상태를 정의합니다.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 파싱된 액세스 로그 이벤트
///
/// 로그 파일의 한 라인에 해당합니다. 파싱에 성공한 경우에만 생성되며,
/// 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// 요청 출발지 주소
    pub host: String,
    /// 요청 사용자
    pub user: String,
    /// 요청 시각 (로그 라인에 기록된 타임존 포함)
    pub timestamp: DateTime<FixedOffset>,
    /// HTTP 메서드
    pub method: String,
    /// 요청 경로 전체
    pub path: String,
    /// 경로의 첫 번째 세그먼트 (통계 그룹 키)
    pub section: String,
    /// HTTP 상태 코드
    pub status_code: u16,
    /// 응답 크기 (바이트)
    pub byte_size: u64,
    /// 에러 응답 여부 (`status_code >= 400`)
    pub is_error: bool,
}

impl LogEvent {
    /// 경로에서 섹션을 도출합니다.
    ///
    /// 루트 이하 세그먼트가 둘 이상이면 `"/" + 첫 세그먼트`,
    /// 그렇지 않으면 경로 그대로입니다.
    ///
    /// - `/config/update` -> `/config`
    /// - `/config` -> `/config`
    /// - `/` -> `/`
    pub fn section_of(path: &str) -> String {
        let pieces: Vec<&str> = path.split('/').collect();
        if pieces.len() > 2 {
            format!("/{}", pieces[1])
        } else {
            path.to_owned()
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} status={} bytes={}",
            self.host, self.method, self.path, self.status_code, self.byte_size,
        )
    }
}

/// 한 섹션에 대한 집계 결과
///
/// 집계 대상 컬렉션 안에서 동일한 `section` 값을 가진 이벤트들의 묶음입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDetail {
    /// 그룹 키 (집계 결과 내에서 유일)
    pub section: String,
    /// 이벤트 수
    pub hits: u64,
    /// 에러 이벤트 수
    pub errors: u64,
    /// 멤버 이벤트 (입력 순서 유지)
    pub events: Vec<LogEvent>,
}

impl fmt::Display for SectionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits={} errors={}",
            self.section, self.hits, self.errors,
        )
    }
}

/// 알림 상태
///
/// 단순 on/off가 아니라 4개 상태의 순환입니다. `JustRecovered`는
/// 회복 알림을 정확히 한 번 내보내기 위한 1-tick 펄스 상태이며,
/// 다음 tick에 무조건 `Idle`로 돌아갑니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    /// 알림 없음 (초기 상태)
    #[default]
    Idle,
    /// 임계값 초과, 발생 알림 방금 내보냄
    Alerting,
    /// 임계값 초과 지속 중, 발생 알림은 이미 내보냄
    PendingRecovery,
    /// 방금 회복됨, 회복 알림 내보냄
    JustRecovered,
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Alerting => write!(f, "alerting"),
            Self::PendingRecovery => write!(f, "pending recovery"),
            Self::JustRecovered => write!(f, "just recovered"),
        }
    }
}
