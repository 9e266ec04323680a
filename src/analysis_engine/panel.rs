//! 진행 패널 뷰 모델
//!
//! 렌더러가 의존하는 DOM 계약을 요소 식별자 기반 패치 목록으로 추상화합니다.
//! 대상 요소가 바인딩되지 않은 패치는 조용히 건너뜁니다. 결과 페이지처럼
//! 진행 패널이 없는 부분 레이아웃이 정상 케이스이기 때문입니다.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

/// 전체 진행 바 요소 식별자
pub const OVERALL_BAR_ID: &str = "progress-bar";
/// 전체 진행률 텍스트 요소 식별자
pub const OVERALL_PERCENTAGE_ID: &str = "progress-percentage";
/// 전체 진행 요약 요소 식별자
pub const OVERALL_SUMMARY_ID: &str = "progress-summary";
/// 로딩 텍스트 요소 식별자
pub const LOADING_TEXT_ID: &str = "loading-text";
/// 진행 패널 컨테이너 식별자
pub const PROGRESS_CONTAINER_ID: &str = "progress-container";
/// 결과 영역 식별자
pub const RESULTS_SECTION_ID: &str = "results";
/// 남성 기준 추천 출력 영역
pub const MALE_RECOMMENDATION_ID: &str = "male-recommendation";
/// 여성 기준 추천 출력 영역
pub const FEMALE_RECOMMENDATION_ID: &str = "female-recommendation";

/// 단계 표시 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StagePhase {
    /// 완료된 단계
    Completed,
    /// 현재 진행 중인 단계
    Active,
    /// 대기 중인 단계
    Pending,
}

/// 패널에 적용되는 원자적 변경
#[derive(Debug, Clone, PartialEq)]
pub enum PanelPatch {
    /// 채움 바 폭 변경 (0..=100)
    FillWidth { id: String, percent: f64 },
    /// 텍스트 라벨 변경
    Text { id: String, text: String },
    /// 상태 글리프 변경 (✅ / 🔄 / ⏳)
    Glyph { id: String, glyph: &'static str },
    /// 단계 컨테이너 분류 변경
    StageClass { id: String, phase: StagePhase },
    /// 페이드아웃 전환 시작
    FadeOut { id: String },
    /// 요소 숨김
    Hide { id: String },
    /// 결과 영역 페이드인 + 스크롤 표시
    RevealResults,
}

impl PanelPatch {
    /// 패치가 참조하는 요소 식별자
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::FillWidth { id, .. }
            | Self::Text { id, .. }
            | Self::Glyph { id, .. }
            | Self::StageClass { id, .. }
            | Self::FadeOut { id }
            | Self::Hide { id } => id,
            Self::RevealResults => RESULTS_SECTION_ID,
        }
    }
}

/// 패널 변경을 받는 싱크
///
/// 구현체는 바인딩되지 않은 대상 패치를 오류 없이 무시해야 합니다.
pub trait PanelSink: Send {
    fn apply(&mut self, patch: PanelPatch);
}

/// 바인딩된 요소 하나의 현재 상태
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementState {
    pub fill_percent: Option<f64>,
    pub text: Option<String>,
    pub glyph: Option<&'static str>,
    pub phase: Option<StagePhase>,
    pub hidden: bool,
    pub fading: bool,
}

/// 메모리 패널 싱크
///
/// 테스트와 데모에서 패널의 현재 상태를 관찰하기 위한 구현체입니다.
/// `bound`가 `Some`이면 해당 집합에 없는 요소는 부분 레이아웃으로 간주하여
/// 건너뛰고, 건너뛴 횟수만 기록합니다.
#[derive(Debug, Default)]
pub struct MemoryPanel {
    bound: Option<HashSet<String>>,
    elements: HashMap<String, ElementState>,
    results_revealed: bool,
    skipped: u64,
}

impl MemoryPanel {
    /// 모든 요소가 바인딩된 패널
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 지정한 요소만 바인딩된 부분 레이아웃 패널
    #[must_use]
    pub fn with_bound_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bound: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    fn is_bound(&self, id: &str) -> bool {
        self.bound.as_ref().is_none_or(|set| set.contains(id))
    }

    /// 요소의 현재 상태
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&ElementState> {
        self.elements.get(id)
    }

    /// 요소의 현재 채움 폭
    #[must_use]
    pub fn fill_of(&self, id: &str) -> Option<f64> {
        self.elements.get(id).and_then(|e| e.fill_percent)
    }

    /// 요소의 현재 텍스트
    #[must_use]
    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.elements.get(id).and_then(|e| e.text.as_deref())
    }

    /// 요소의 현재 분류
    #[must_use]
    pub fn phase_of(&self, id: &str) -> Option<StagePhase> {
        self.elements.get(id).and_then(|e| e.phase)
    }

    /// 결과 영역 표시 여부
    #[must_use]
    pub fn results_revealed(&self) -> bool {
        self.results_revealed
    }

    /// 바인딩되지 않아 건너뛴 패치 수
    #[must_use]
    pub fn skipped_patches(&self) -> u64 {
        self.skipped
    }
}

impl PanelSink for MemoryPanel {
    fn apply(&mut self, patch: PanelPatch) {
        if !self.is_bound(patch.target()) {
            // 부분 레이아웃: 오류가 아니므로 조용히 건너뜀
            self.skipped += 1;
            return;
        }

        match patch {
            PanelPatch::FillWidth { id, percent } => {
                self.elements.entry(id).or_default().fill_percent = Some(percent);
            }
            PanelPatch::Text { id, text } => {
                self.elements.entry(id).or_default().text = Some(text);
            }
            PanelPatch::Glyph { id, glyph } => {
                self.elements.entry(id).or_default().glyph = Some(glyph);
            }
            PanelPatch::StageClass { id, phase } => {
                self.elements.entry(id).or_default().phase = Some(phase);
            }
            PanelPatch::FadeOut { id } => {
                self.elements.entry(id).or_default().fading = true;
            }
            PanelPatch::Hide { id } => {
                let entry = self.elements.entry(id).or_default();
                entry.hidden = true;
                entry.fading = false;
            }
            PanelPatch::RevealResults => {
                self.results_revealed = true;
            }
        }
    }
}

/// 콘솔 패널 싱크 - 데모 바이너리에서 패치를 tracing으로 출력
#[derive(Debug, Default)]
pub struct ConsolePanel;

impl PanelSink for ConsolePanel {
    fn apply(&mut self, patch: PanelPatch) {
        match &patch {
            PanelPatch::FillWidth { id, percent } => debug!("🎨 {id} width={percent:.0}%"),
            PanelPatch::Text { id, text } => debug!("🎨 {id} text={text}"),
            PanelPatch::Glyph { id, glyph } => debug!("🎨 {id} glyph={glyph}"),
            PanelPatch::StageClass { id, phase } => debug!("🎨 {id} phase={phase:?}"),
            PanelPatch::FadeOut { id } => debug!("🎨 {id} fade-out"),
            PanelPatch::Hide { id } => debug!("🎨 {id} hidden"),
            PanelPatch::RevealResults => debug!("🎨 results revealed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_targets_are_silently_skipped() {
        let mut panel = MemoryPanel::with_bound_ids([OVERALL_BAR_ID]);
        panel.apply(PanelPatch::FillWidth {
            id: OVERALL_BAR_ID.to_string(),
            percent: 40.0,
        });
        panel.apply(PanelPatch::Text {
            id: "progress-text-ocr".to_string(),
            text: "완료".to_string(),
        });

        assert_eq!(panel.fill_of(OVERALL_BAR_ID), Some(40.0));
        assert!(panel.text_of("progress-text-ocr").is_none());
        assert_eq!(panel.skipped_patches(), 1);
    }

    #[test]
    fn hide_clears_fading_state() {
        let mut panel = MemoryPanel::new();
        panel.apply(PanelPatch::FadeOut {
            id: PROGRESS_CONTAINER_ID.to_string(),
        });
        assert!(panel.element(PROGRESS_CONTAINER_ID).unwrap().fading);

        panel.apply(PanelPatch::Hide {
            id: PROGRESS_CONTAINER_ID.to_string(),
        });
        let state = panel.element(PROGRESS_CONTAINER_ID).unwrap();
        assert!(state.hidden);
        assert!(!state.fading);
    }
}
