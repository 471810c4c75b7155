//! 이벤트 저장소 -- append-only 이벤트 시퀀스와 트레일링 윈도우 질의
//!
//! [`EventStore`]는 파싱된 이벤트를 도착 순서대로 보관합니다.
//! 제거 연산은 없으며 프로세스 수명 동안 무한히 성장합니다
//! (단일 호스트, 수 분~수 시간 규모를 가정한 설계상의 비목표).

use chrono::{DateTime, Utc};

use watchpost_core::types::LogEvent;

/// append-only 이벤트 저장소
///
/// 삽입 순서 = 도착 순서입니다. 타임스탬프의 단조 증가는 가정하지 않으므로
/// 순서가 뒤섞인 라인이나 백필된 라인이 들어와도 윈도우 질의는 안전합니다.
/// 중복 제거는 하지 않습니다 (at-most-once 전달은 수집기 경계의 책임).
#[derive(Debug, Default)]
pub struct EventStore {
    /// 저장된 이벤트 (삽입 순서)
    events: Vec<LogEvent>,
}

impl EventStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 이벤트를 끝에 추가합니다. O(1) amortized.
    pub fn append(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    /// 저장된 모든 이벤트를 삽입 순서로 반환합니다.
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// 저장된 이벤트 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 저장소가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// `now` 기준 최근 `window_seconds`초 이내의 이벤트를 삽입 순서로 반환합니다.
    ///
    /// 경과 시간은 정수 초로 버림 비교합니다: 경과 15초는 윈도우 10에
    /// 포함되지 않고, 경과 10.9초는 포함됩니다. `now`는 호출자가 공급하므로
    /// 질의가 결정적이며 테스트 가능합니다.
    pub fn trailing_window(&self, now: DateTime<Utc>, window_seconds: u64) -> Vec<LogEvent> {
        let window = i64::try_from(window_seconds).unwrap_or(i64::MAX);
        self.events
            .iter()
            .filter(|e| now.signed_duration_since(e.timestamp).num_seconds() <= window)
            .cloned()
            .collect()
    }
}
