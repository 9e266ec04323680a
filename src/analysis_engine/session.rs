//! 세션 연속성 플래그와 페이지 로드 가드
//!
//! 제출이 분석 파이프라인에 들어갈 때 연속성 플래그를 세우고, 페이지 로드
//! 시점마다 결과 화면을 보여줄지 판정합니다. 새로고침 루프가 오래된 결과를
//! 다시 띄우는 것을 막는 것이 목적입니다.
//!
//! 플래그는 read-then-clear로 다뤄지지만 한 번에 하나의 페이지 컨텍스트만
//! 접근하므로 단일 탭에서는 경쟁이 없습니다. 다중 탭 동작은 미해결 문제로
//! 남겨둡니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

pub use crate::infrastructure::config::GuardSettings;

/// 연속성 플래그 키 (분석 제출 직후 설정)
pub const CONTINUATION_FLAG_KEY: &str = "analysis_submitted";
/// 마지막 페이지 로드 시각 키 (밀리초 epoch)
pub const LAST_LOAD_TS_KEY: &str = "last_load_ts";
/// 의도적 초기화 방문을 나타내는 질의 매개변수
pub const FROM_RESET_PARAM: &str = "from_reset";

/// 탭/세션 수명의 문자열 KV 저장소 (sessionStorage 대응)
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// 메모리 세션 저장소
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// 페이지 로드 시점의 관찰 가능한 상태
#[derive(Debug, Clone)]
pub struct PageLoadContext {
    /// 결과 영역이 존재하고 비어 있지 않은지
    pub results_present: bool,
    /// 현재 페이지 URL
    pub url: Url,
    /// 로드 시각
    pub now: DateTime<Utc>,
}

/// 리다이렉트 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// 연속성 플래그 없이 결과 화면에 직접 접근
    DirectNavigation,
    /// 마지막 로드 이후 디바운스 임계 이하의 새로고침
    AccidentalRefresh,
}

/// 페이지 로드 가드 판정
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// 정당한 분석 후 결과 화면
    ShowResults,
    /// 진입 페이지로 리다이렉트
    RedirectToEntry(RedirectReason),
    /// 결과 영역이 없는 일반 페이지
    Stay,
}

/// 가드 판정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub decision: NavigationDecision,
    /// `from_reset` 매개변수를 제거한 URL (제거가 일어난 경우에만)
    pub cleaned_url: Option<Url>,
}

/// 제출이 파이프라인에 들어갈 때 호출: 연속성 플래그와 시각 기록
pub fn mark_analysis_submitted(store: &mut (impl SessionStore + ?Sized), now: DateTime<Utc>) {
    store.set(CONTINUATION_FLAG_KEY, "true");
    store.set(LAST_LOAD_TS_KEY, &now.timestamp_millis().to_string());
    info!("📍 continuation flag set for submitted analysis");
}

/// 모든 페이지 로드에서 호출되는 가드
///
/// 결과 영역이 존재할 때:
/// - `from_reset=true` → 의도적 방문: 플래그 제거, URL에서 매개변수 제거
/// - 플래그 없음 → 직접 접근: 리다이렉트
/// - 플래그가 있어도 로드 간격이 디바운스 임계 미만 → 우발적 새로고침: 리다이렉트
/// - 그 외 → 정당한 분석 후 결과 화면 (플래그 소모)
pub fn handle_page_refresh(
    store: &mut (impl SessionStore + ?Sized),
    page: &PageLoadContext,
    settings: &GuardSettings,
) -> GuardOutcome {
    let previous_load = store
        .get(LAST_LOAD_TS_KEY)
        .and_then(|raw| raw.parse::<i64>().ok());
    store.set(
        LAST_LOAD_TS_KEY,
        &page.now.timestamp_millis().to_string(),
    );

    if !page.results_present {
        return GuardOutcome {
            decision: NavigationDecision::Stay,
            cleaned_url: None,
        };
    }

    if has_reset_param(&page.url) {
        debug!("from_reset visit, clearing continuation flag");
        store.remove(CONTINUATION_FLAG_KEY);
        return GuardOutcome {
            decision: NavigationDecision::ShowResults,
            cleaned_url: Some(strip_reset_param(&page.url)),
        };
    }

    if store.get(CONTINUATION_FLAG_KEY).is_none() {
        info!("results view without continuation flag, redirecting to entry");
        return GuardOutcome {
            decision: NavigationDecision::RedirectToEntry(RedirectReason::DirectNavigation),
            cleaned_url: None,
        };
    }

    if let Some(previous) = previous_load {
        let delta_ms = page.now.timestamp_millis().saturating_sub(previous);
        if delta_ms >= 0 && (delta_ms as u64) < settings.refresh_debounce_ms {
            info!("refresh within {delta_ms}ms, treating as accidental reload");
            store.remove(CONTINUATION_FLAG_KEY);
            return GuardOutcome {
                decision: NavigationDecision::RedirectToEntry(RedirectReason::AccidentalRefresh),
                cleaned_url: None,
            };
        }
    }

    // 정상 도착: 플래그는 소모된다
    store.remove(CONTINUATION_FLAG_KEY);
    GuardOutcome {
        decision: NavigationDecision::ShowResults,
        cleaned_url: None,
    }
}

fn has_reset_param(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == FROM_RESET_PARAM && (value == "true" || value == "1"))
}

/// `from_reset` 매개변수만 제거한 URL
fn strip_reset_param(url: &Url) -> Url {
    let mut cleaned = url.clone();
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != FROM_RESET_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if remaining.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned
            .query_pairs_mut()
            .clear()
            .extend_pairs(remaining.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page(url: &str, results: bool, now_ms: i64) -> PageLoadContext {
        PageLoadContext {
            results_present: results,
            url: Url::parse(url).unwrap(),
            now: Utc.timestamp_millis_opt(now_ms).unwrap(),
        }
    }

    #[test]
    fn reset_param_is_stripped_and_flag_cleared() {
        let mut store = MemorySessionStore::new();
        store.set(CONTINUATION_FLAG_KEY, "true");

        let outcome = handle_page_refresh(
            &mut store,
            &page("https://nutriscan.kr/?from_reset=true&tab=results", true, 10_000),
            &GuardSettings::default(),
        );

        assert_eq!(outcome.decision, NavigationDecision::ShowResults);
        let cleaned = outcome.cleaned_url.unwrap();
        assert_eq!(cleaned.query(), Some("tab=results"));
        assert!(store.get(CONTINUATION_FLAG_KEY).is_none());
    }

    #[test]
    fn reset_param_strip_drops_empty_query() {
        let url = Url::parse("https://nutriscan.kr/?from_reset=1").unwrap();
        assert_eq!(strip_reset_param(&url).query(), None);
    }

    #[test]
    fn last_load_timestamp_is_recorded_on_every_load() {
        let mut store = MemorySessionStore::new();
        handle_page_refresh(
            &mut store,
            &page("https://nutriscan.kr/", false, 42_000),
            &GuardSettings::default(),
        );
        assert_eq!(store.get(LAST_LOAD_TS_KEY).as_deref(), Some("42000"));
    }
}
