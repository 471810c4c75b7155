//! 섹션별 집계 -- 히트/에러 카운트 및 정렬
//!
//! 이벤트 컬렉션(보통 트레일링 윈도우 결과 또는 전체 저장소)을
//! 섹션 단위로 묶어 [`SectionDetail`] 목록을 만듭니다.
//! 상태를 갖지 않는 순수 함수이며 윈도우에 대해 알지 못합니다.

use watchpost_core::types::{LogEvent, SectionDetail};

/// 이벤트를 섹션별로 그룹핑합니다.
///
/// - 그룹 키: `section` 문자열의 완전 일치
/// - 그룹 순서: 입력에서 섹션이 처음 등장한 순서
/// - 그룹 내 이벤트: 입력 순서 유지
pub fn group_by_section(events: &[LogEvent]) -> Vec<SectionDetail> {
    let mut details: Vec<SectionDetail> = Vec::new();

    for event in events {
        match details.iter_mut().find(|d| d.section == event.section) {
            Some(detail) => {
                detail.hits += 1;
                if event.is_error {
                    detail.errors += 1;
                }
                detail.events.push(event.clone());
            }
            None => {
                details.push(SectionDetail {
                    section: event.section.clone(),
                    hits: 1,
                    errors: u64::from(event.is_error),
                    events: vec![event.clone()],
                });
            }
        }
    }

    details
}

/// 히트 수 내림차순으로 정렬합니다.
///
/// 안정 정렬이므로 히트 수가 같은 섹션은 기존(처음 등장) 순서를 유지합니다.
pub fn sort_by_hits_desc(mut details: Vec<SectionDetail>) -> Vec<SectionDetail> {
    details.sort_by(|a, b| b.hits.cmp(&a.hits));
    details
}
