//! 진행 상황 렌더러
//!
//! (단계, 진행률, 메시지)를 패널 패치 목록으로 환원하는 순수 함수와 이를
//! 공유 패널에 적용하는 트래커입니다. 렌더러는 자체 기억을 갖지 않고 매 호출마다
//! 현재 단계 인덱스만으로 완료/진행/대기 분류를 다시 계산하므로 멱등하며
//! 중복 호출에 안전합니다.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::analysis_engine::panel::{
    LOADING_TEXT_ID, OVERALL_BAR_ID, OVERALL_PERCENTAGE_ID, OVERALL_SUMMARY_ID, PanelPatch,
    PanelSink, StagePhase,
};
use crate::analysis_engine::stages::AnalysisStage;

/// 완료 글리프
const GLYPH_COMPLETED: &str = "✅";
/// 진행 중 글리프
const GLYPH_ACTIVE: &str = "🔄";
/// 대기 글리프
const GLYPH_PENDING: &str = "⏳";

/// 단계 인덱스 분류: `i < c` 완료, `i == c` 진행, `i > c` 대기
#[must_use]
pub fn classify(index: usize, current: usize) -> StagePhase {
    match index.cmp(&current) {
        std::cmp::Ordering::Less => StagePhase::Completed,
        std::cmp::Ordering::Equal => StagePhase::Active,
        std::cmp::Ordering::Greater => StagePhase::Pending,
    }
}

/// 전체 진행률: `min(100, index * 가중치 + percent * 가중치 / 100)`
#[must_use]
pub fn overall_percent(stage: AnalysisStage, percent: f64) -> f64 {
    let weight = AnalysisStage::weight();
    let percent = percent.clamp(0.0, 100.0);
    (stage.index() as f64 * weight + percent * weight / 100.0).min(100.0)
}

/// (단계, 진행률, 메시지) → 패널 패치 목록
///
/// 알 수 없는 단계는 전체 진행률에 영향을 주지 않고, 해당 식별자에 바인딩된
/// 라벨만 갱신합니다.
#[must_use]
pub fn render_patches(step: &str, percent: f64, message: &str) -> Vec<PanelPatch> {
    let Some(stage) = AnalysisStage::from_wire(step) else {
        return vec![
            PanelPatch::Text {
                id: format!("progress-text-{step}"),
                text: message.to_string(),
            },
            PanelPatch::Text {
                id: LOADING_TEXT_ID.to_string(),
                text: AnalysisStage::FALLBACK_LOADING_TEXT.to_string(),
            },
        ];
    };
    render_stage_patches(stage, percent, message)
}

/// 해석된 단계에 대한 패치 목록
#[must_use]
pub fn render_stage_patches(stage: AnalysisStage, percent: f64, message: &str) -> Vec<PanelPatch> {
    let percent = percent.clamp(0.0, 100.0);
    let current = stage.index();
    let overall = overall_percent(stage, percent);
    let overall_label = format!("{}%", overall.round() as i64);

    let mut patches = Vec::with_capacity(4 + AnalysisStage::COUNT * 4);
    patches.push(PanelPatch::FillWidth {
        id: OVERALL_BAR_ID.to_string(),
        percent: overall,
    });
    patches.push(PanelPatch::Text {
        id: OVERALL_PERCENTAGE_ID.to_string(),
        text: overall_label.clone(),
    });
    patches.push(PanelPatch::Text {
        id: OVERALL_SUMMARY_ID.to_string(),
        text: overall_label,
    });

    for (index, entry) in AnalysisStage::ALL.into_iter().enumerate() {
        let phase = classify(index, current);
        let slug = entry.slug();
        let (fill, glyph, label) = match phase {
            StagePhase::Completed => (100.0, GLYPH_COMPLETED, "완료".to_string()),
            StagePhase::Active => {
                let label = if message.is_empty() {
                    format!("{}%", percent.round() as i64)
                } else {
                    message.to_string()
                };
                (percent, GLYPH_ACTIVE, label)
            }
            StagePhase::Pending => (0.0, GLYPH_PENDING, "대기중...".to_string()),
        };

        patches.push(PanelPatch::StageClass {
            id: entry.element_id().to_string(),
            phase,
        });
        patches.push(PanelPatch::Glyph {
            id: format!("status-{slug}"),
            glyph,
        });
        patches.push(PanelPatch::FillWidth {
            id: format!("progress-{slug}"),
            percent: fill,
        });
        patches.push(PanelPatch::Text {
            id: format!("progress-text-{slug}"),
            text: label,
        });
    }

    patches.push(PanelPatch::Text {
        id: LOADING_TEXT_ID.to_string(),
        text: stage.loading_text().to_string(),
    });

    patches
}

/// 공유 패널에 렌더링을 적용하는 트래커
///
/// 패널은 드라이버와 Completion Handler가 공유하는 유일한 가변 자원입니다.
/// 갱신이 멱등하므로 마지막 기록이 이기는 방식으로 충분합니다.
pub struct ProgressTracker<S: PanelSink> {
    panel: Arc<Mutex<S>>,
}

impl<S: PanelSink> ProgressTracker<S> {
    #[must_use]
    pub fn new(panel: Arc<Mutex<S>>) -> Self {
        Self { panel }
    }

    /// 와이어 단계 식별자로 렌더링
    pub fn render(&self, step: &str, percent: f64, message: &str) {
        self.apply_all(render_patches(step, percent, message));
    }

    /// 해석된 단계로 렌더링
    pub fn render_stage(&self, stage: AnalysisStage, percent: f64, message: &str) {
        self.apply_all(render_stage_patches(stage, percent, message));
    }

    fn apply_all(&self, patches: Vec<PanelPatch>) {
        match self.panel.lock() {
            Ok(mut panel) => {
                for patch in patches {
                    panel.apply(patch);
                }
            }
            Err(poisoned) => {
                // 패널 갱신은 멱등하므로 오염된 락도 그대로 사용 가능
                warn!("panel lock poisoned, applying patches anyway");
                let mut panel = poisoned.into_inner();
                for patch in patches {
                    panel.apply(patch);
                }
            }
        }
    }
}
