//! 알림 상태 기계 -- 트래픽 비율 신호를 디바운스된 알림으로 변환합니다.
//!
//! [`AlertStateMachine`]은 tick마다 트레일링 윈도우 이벤트 수를 받아
//! 히스테리시스 상태 전이를 수행하고, 전이가 일어나는 순간에만
//! [`AlertNotification`]을 내보냅니다. 발생/회복 알림은 에피소드당
//! 정확히 한 번씩만 생성됩니다.
//!
//! # 상태 전이표
//!
//! | 현재 | 조건 | 다음 | 알림 |
//! |---|---|---|---|
//! | Idle | rate >= threshold | Alerting | 발생 |
//! | Idle | rate < threshold | Idle | 없음 |
//! | Alerting | rate < threshold | JustRecovered | 회복 |
//! | Alerting | rate >= threshold | PendingRecovery | 없음 |
//! | PendingRecovery | rate < threshold | JustRecovered | 회복 |
//! | PendingRecovery | rate >= threshold | PendingRecovery | 없음 |
//! | JustRecovered | (무조건) | Idle | 없음 |
//!
//! 판정에 쓰는 rate는 `count / window_seconds`의 정수 나눗셈입니다.
//! 소수 rate는 표시용으로만 별도 전달됩니다. 이는 의도된, 테스트로
//! 고정된 동작입니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use watchpost_core::types::AlertState;

use crate::error::MonitorError;

/// 알림 타임스탬프 표시 형식 (항상 UTC)
const NOTIFICATION_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S +0000";

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    /// 고트래픽 알림 발생
    Raised,
    /// 고트래픽 알림 회복
    Cleared,
}

/// 상태 전이 시 생성되는 알림
///
/// 사용자에게 보여줄 문자열은 `Display` 구현이 만듭니다.
#[derive(Debug, Clone, Serialize)]
pub struct AlertNotification {
    /// 알림 고유 ID
    pub id: String,
    /// 알림 종류
    pub kind: AlertKind,
    /// 판정 시점의 윈도우 이벤트 수
    pub count: u64,
    /// 표시용 비율 (초당 요청 수, 소수)
    pub rate: f64,
    /// 전이가 일어난 시각
    pub triggered_at: DateTime<Utc>,
}

impl fmt::Display for AlertNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = self.triggered_at.format(NOTIFICATION_TIMESTAMP_FORMAT);
        match self.kind {
            AlertKind::Raised => write!(
                f,
                "High traffic generated an alert - hits = {:.2}/sec, triggered at {}",
                self.rate, timestamp,
            ),
            AlertKind::Cleared => write!(
                f,
                "High traffic alert recovered - hits = {:.2}/sec, triggered at {}",
                self.rate, timestamp,
            ),
        }
    }
}

/// 히스테리시스 알림 상태 기계
///
/// 프로세스 전역 싱글턴이 아니라 소유자(파이프라인)가 들고 다니는
/// 명시적 상태 객체입니다. tick 드라이버는 하나만 존재해야 합니다.
#[derive(Debug)]
pub struct AlertStateMachine {
    /// 현재 상태
    state: AlertState,
    /// 알림 임계값 (초당 요청 수)
    threshold: u32,
    /// 판정 윈도우 (초)
    window_seconds: u64,
    /// 마지막 tick의 윈도우 이벤트 수 (표시용)
    last_count: u64,
    /// 마지막 tick의 소수 비율 (표시용)
    last_rate: f64,
}

impl AlertStateMachine {
    /// 새 상태 기계를 생성합니다.
    ///
    /// `window_seconds == 0`이면 비율이 정의되지 않으므로 즉시 실패합니다.
    pub fn new(threshold: u32, window_seconds: u64) -> Result<Self, MonitorError> {
        if window_seconds == 0 {
            return Err(MonitorError::Config {
                field: "alert_window_seconds".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        if threshold == 0 {
            return Err(MonitorError::Config {
                field: "alert_rate_threshold".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(Self {
            state: AlertState::Idle,
            threshold,
            window_seconds,
            last_count: 0,
            last_rate: 0.0,
        })
    }

    /// 한 번의 평가 tick을 수행합니다.
    ///
    /// `count`는 호출자가 계산한 트레일링 윈도우 이벤트 수입니다.
    /// 전이가 알림을 동반하는 경우에만 `Some`을 반환합니다.
    pub fn tick(&mut self, count: u64, now: DateTime<Utc>) -> Option<AlertNotification> {
        // 판정은 정수 나눗셈, 표시는 소수
        let per_second = count / self.window_seconds;
        self.last_count = count;
        self.last_rate = count as f64 / self.window_seconds as f64;

        let threshold = u64::from(self.threshold);

        let (next, kind) = match self.state {
            AlertState::Idle => {
                if per_second >= threshold {
                    (AlertState::Alerting, Some(AlertKind::Raised))
                } else {
                    (AlertState::Idle, None)
                }
            }
            AlertState::Alerting => {
                if per_second < threshold {
                    (AlertState::JustRecovered, Some(AlertKind::Cleared))
                } else {
                    (AlertState::PendingRecovery, None)
                }
            }
            AlertState::PendingRecovery => {
                if per_second < threshold {
                    (AlertState::JustRecovered, Some(AlertKind::Cleared))
                } else {
                    (AlertState::PendingRecovery, None)
                }
            }
            // 회복 알림은 이미 나갔으므로 무조건 Idle로 복귀하는 1-tick 펄스
            AlertState::JustRecovered => (AlertState::Idle, None),
        };

        if next != self.state {
            tracing::debug!(
                from = %self.state,
                to = %next,
                count,
                per_second,
                "alert state transition"
            );
        }
        self.state = next;

        kind.map(|kind| AlertNotification {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            count,
            rate: self.last_rate,
            triggered_at: now,
        })
    }

    /// 현재 상태를 반환합니다.
    pub fn state(&self) -> AlertState {
        self.state
    }

    /// 마지막 tick의 윈도우 이벤트 수를 반환합니다.
    pub fn last_count(&self) -> u64 {
        self.last_count
    }

    /// 마지막 tick의 소수 비율을 반환합니다.
    pub fn last_rate(&self) -> f64 {
        self.last_rate
    }

    /// 설정된 판정 윈도우(초)를 반환합니다.
    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// 상태를 초기 상태(`Idle`)로 되돌립니다 (테스트용 훅).
    pub fn reset(&mut self) {
        self.state = AlertState::Idle;
        self.last_count = 0;
        self.last_rate = 0.0;
    }
}
