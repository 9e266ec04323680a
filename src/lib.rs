//! NutriScan v2 - 영양성분표 분석 진행 엔진
//!
//! 업로드한 영양성분표 이미지의 분석 진행 상태를 관리합니다.
//! 서버 연결이 없으면 타이머 기반 시뮬레이션으로, 연결이 있으면
//! 서버 푸시 이벤트로 동일한 진행 패널을 구동합니다.

// Module declarations
pub mod analysis_engine;
pub mod domain;
pub mod infrastructure;
pub mod ts_gen;

// Re-export commonly used items
pub use analysis_engine::{
    AnalysisStage, DriverGuard, DriverKind, MemoryPanel, PanelBridge, PanelPatch, PanelSink,
    ProgressSignal, ProgressTracker,
};
pub use infrastructure::config::AppConfig;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::info;

use analysis_engine::completion::{CompletionHandler, RevealStrategy};
use analysis_engine::events::FileMeta;
use analysis_engine::panel::ConsolePanel;
use analysis_engine::session::MemorySessionStore;
use analysis_engine::simulation::SimulationDriver;

/// 시뮬레이션 모드로 전체 파이프라인을 한 번 실행하는 데모 엔트리
///
/// 콘솔 패널에 진행 패치를 출력하고, 완료 연출까지 마친 뒤 반환합니다.
pub async fn run() -> Result<()> {
    infrastructure::logging::init_logging()?;
    infrastructure::logging::log_system_info();

    let config = AppConfig::default();
    config.validate()?;

    let session_id = uuid::Uuid::new_v4();
    info!("🧾 page session {session_id}");

    let (signal_tx, signal_rx) = broadcast::channel(config.channels.signal_buffer_size);
    let guard = DriverGuard::new();

    let panel = Arc::new(Mutex::new(ConsolePanel));
    let tracker = ProgressTracker::new(Arc::clone(&panel));
    let store: Arc<Mutex<dyn analysis_engine::session::SessionStore + Send>> =
        Arc::new(Mutex::new(MemorySessionStore::new()));
    let completion = Arc::new(CompletionHandler::new(
        panel,
        store,
        config.completion.clone(),
        RevealStrategy::ScrollIntoView,
    ));

    let mut bridge = PanelBridge::new(signal_rx, tracker, guard, Arc::clone(&completion));
    let bridge_handle = tokio::spawn(async move { bridge.start().await });

    let files = vec![FileMeta::new("nutrition-label.jpg", 1_048_576, "image/jpeg")];

    info!("🚀 starting simulated analysis for {} file(s)", files.len());
    let driver = SimulationDriver::new(files, signal_tx.clone(), config.simulation.clone());
    driver.run().await;

    // 송신자를 모두 내려 브릿지 루프가 채널 종료로 빠져나오게 한다
    drop(driver);
    drop(signal_tx);
    let _ = bridge_handle.await;

    // 브릿지가 띄운 완료 전이가 끝날 때까지 대기
    use analysis_engine::completion::CompletionState;
    while completion.state() != CompletionState::ResultsShown {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    info!("✅ analysis pipeline finished");
    Ok(())
}
