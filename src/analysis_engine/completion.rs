//! 완료 핸들러
//!
//! 종단 전이: 진행 패널을 숨기고 결과를 드러냅니다.
//! `InProgress → FadingOut → ResultsShown` 상태 기계이며, 여러 경로
//! (`analysis_progress`의 complete/100, `llm_response`의 complete)에서
//! 트리거되어도 정확히 한 번만 실행됩니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::analysis_engine::panel::{PROGRESS_CONTAINER_ID, PanelPatch, PanelSink};
use crate::analysis_engine::session::{SessionStore, mark_analysis_submitted};

pub use crate::infrastructure::config::CompletionSettings;

/// 완료 전이 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    InProgress,
    FadingOut,
    ResultsShown,
}

/// 결과 표시 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStrategy {
    /// 기존 결과 영역을 페이드인하며 스크롤
    ScrollIntoView,
    /// 연속성 플래그를 세우고 전체 페이지를 다시 로드
    ///
    /// 클라이언트/서버 결과가 어긋날 여지가 없는 대신 전체 리로드 비용을
    /// 치른다.
    ReloadWithFlag,
}

/// 호스트 표면에 요청하는 표시 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealAction {
    ScrollIntoView,
    Reload,
}

/// 진행 패널을 닫고 결과 화면으로 전환하는 핸들러
pub struct CompletionHandler<S: PanelSink> {
    panel: Arc<Mutex<S>>,
    store: Arc<Mutex<dyn SessionStore + Send>>,
    state: Mutex<CompletionState>,
    fired: AtomicBool,
    settings: CompletionSettings,
    strategy: RevealStrategy,
}

impl<S: PanelSink> CompletionHandler<S> {
    #[must_use]
    pub fn new(
        panel: Arc<Mutex<S>>,
        store: Arc<Mutex<dyn SessionStore + Send>>,
        settings: CompletionSettings,
        strategy: RevealStrategy,
    ) -> Self {
        Self {
            panel,
            store,
            state: Mutex::new(CompletionState::InProgress),
            fired: AtomicBool::new(false),
            settings,
            strategy,
        }
    }

    /// 현재 상태
    #[must_use]
    pub fn state(&self) -> CompletionState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// 이미 완료 전이가 실행되었는지
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// 종단 전이 실행. 첫 호출만 동작하며 이후 호출은 `None`.
    pub async fn on_complete(&self) -> Option<RevealAction> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return None;
        }

        info!("🏁 analysis complete, transitioning to results");

        // 사용자가 100%를 읽을 시간을 준다
        tokio::time::sleep(Duration::from_millis(self.settings.read_delay_ms)).await;

        self.set_state(CompletionState::FadingOut);
        self.apply(PanelPatch::FadeOut {
            id: PROGRESS_CONTAINER_ID.to_string(),
        });
        tokio::time::sleep(Duration::from_millis(self.settings.fade_ms)).await;
        self.apply(PanelPatch::Hide {
            id: PROGRESS_CONTAINER_ID.to_string(),
        });

        let action = match self.strategy {
            RevealStrategy::ScrollIntoView => {
                self.apply(PanelPatch::RevealResults);
                RevealAction::ScrollIntoView
            }
            RevealStrategy::ReloadWithFlag => {
                match self.store.lock() {
                    Ok(mut store) => mark_analysis_submitted(&mut *store, Utc::now()),
                    Err(poisoned) => mark_analysis_submitted(&mut *poisoned.into_inner(), Utc::now()),
                }
                RevealAction::Reload
            }
        };

        self.set_state(CompletionState::ResultsShown);
        Some(action)
    }

    fn set_state(&self, next: CompletionState) {
        match self.state.lock() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn apply(&self, patch: PanelPatch) {
        match self.panel.lock() {
            Ok(mut panel) => panel.apply(patch),
            Err(poisoned) => poisoned.into_inner().apply(patch),
        }
    }
}
