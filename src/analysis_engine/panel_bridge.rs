//! 진행 신호 패널 브릿지
//!
//! 드라이버들이 발행한 진행 신호를 수신해 렌더러에 적용하는 브릿지
//! 컴포넌트입니다. 활성 드라이버 토큰이 아닌 출처의 신호는 버리고, 종단
//! 신호에서 완료 핸들러를 실행합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analysis_engine::completion::CompletionHandler;
use crate::analysis_engine::driver::DriverGuard;
use crate::analysis_engine::events::{ProgressSignal, ProgressStep};
use crate::analysis_engine::panel::PanelSink;
use crate::analysis_engine::tracker::ProgressTracker;

/// 신호를 패널 갱신으로 전달하는 브릿지
pub struct PanelBridge<S: PanelSink + Send + 'static> {
    signal_rx: broadcast::Receiver<ProgressSignal>,
    tracker: ProgressTracker<S>,
    guard: DriverGuard,
    completion: Arc<CompletionHandler<S>>,
    is_active: Arc<AtomicBool>,
}

impl<S: PanelSink + Send + 'static> PanelBridge<S> {
    #[must_use]
    pub fn new(
        signal_rx: broadcast::Receiver<ProgressSignal>,
        tracker: ProgressTracker<S>,
        guard: DriverGuard,
        completion: Arc<CompletionHandler<S>>,
    ) -> Self {
        Self {
            signal_rx,
            tracker,
            guard,
            completion,
            is_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 브릿지 시작 - 진행 신호를 패널로 전달
    pub async fn start(&mut self) {
        if self.is_active.swap(true, Ordering::SeqCst) {
            warn!("PanelBridge is already running");
            return;
        }

        info!("🌉 starting panel bridge");

        while self.is_active.load(Ordering::SeqCst) {
            match self.signal_rx.recv().await {
                Ok(signal) => self.handle_signal(signal),
                Err(broadcast::error::RecvError::Closed) => {
                    info!("signal channel closed, stopping panel bridge");
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("panel bridge lagged, skipped {skipped} signals");
                    continue;
                }
            }
        }

        self.is_active.store(false, Ordering::SeqCst);
        info!("🌉 panel bridge stopped");
    }

    /// 브릿지 중지
    pub fn stop(&self) {
        self.is_active.store(false, Ordering::SeqCst);
    }

    fn handle_signal(&self, signal: ProgressSignal) {
        if !self.guard.is_active(signal.source) {
            debug!(
                "dropping {:?} signal for step {:?}, superseded driver",
                signal.source, signal.step
            );
            return;
        }

        match &signal.step {
            ProgressStep::Stage(stage) => {
                info!(
                    "🌉 progress source={:?} stage={} percent={:.0} message={}",
                    signal.source,
                    stage.slug(),
                    signal.percent,
                    signal.message
                );
                self.tracker
                    .render_stage(*stage, signal.percent, &signal.message);
            }
            ProgressStep::Unknown(step) => {
                info!(
                    "🌉 progress source={:?} step={} percent={:.0} message={} (label only)",
                    signal.source, step, signal.percent, signal.message
                );
                self.tracker.render(step, signal.percent, &signal.message);
            }
        }

        if signal.is_terminal() && !self.completion.has_fired() {
            let completion = Arc::clone(&self.completion);
            tokio::spawn(async move {
                if let Some(action) = completion.on_complete().await {
                    info!("🏁 reveal action requested: {action:?}");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use crate::analysis_engine::completion::RevealStrategy;
    use crate::analysis_engine::driver::DriverKind;
    use crate::analysis_engine::panel::{LOADING_TEXT_ID, MemoryPanel};
    use crate::analysis_engine::session::{MemorySessionStore, SessionStore};
    use crate::infrastructure::config::CompletionSettings;

    fn bridge_over(
        panel: Arc<Mutex<MemoryPanel>>,
        rx: broadcast::Receiver<ProgressSignal>,
        guard: DriverGuard,
    ) -> PanelBridge<MemoryPanel> {
        let tracker = ProgressTracker::new(Arc::clone(&panel));
        let store: Arc<Mutex<dyn SessionStore + Send>> =
            Arc::new(Mutex::new(MemorySessionStore::new()));
        let completion = Arc::new(CompletionHandler::new(
            panel,
            store,
            CompletionSettings {
                read_delay_ms: 0,
                fade_ms: 0,
            },
            RevealStrategy::ScrollIntoView,
        ));
        PanelBridge::new(rx, tracker, guard, completion)
    }

    #[tokio::test]
    async fn label_only_signal_updates_its_bound_element() {
        let (tx, rx) = broadcast::channel(16);
        let guard = DriverGuard::new();
        guard.claim_realtime();

        let panel = Arc::new(Mutex::new(MemoryPanel::new()));
        let mut bridge = bridge_over(Arc::clone(&panel), rx, guard);
        let handle = tokio::spawn(async move { bridge.start().await });

        tx.send(ProgressSignal::unmapped(
            DriverKind::Realtime,
            "preprocessing",
            40.0,
            "이미지 전처리 중...",
        ))
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let panel = panel.lock().unwrap();
        assert_eq!(
            panel.text_of("progress-text-preprocessing"),
            Some("이미지 전처리 중...")
        );
        assert!(panel.text_of(LOADING_TEXT_ID).is_some());
    }
}
