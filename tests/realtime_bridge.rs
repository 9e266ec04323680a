//! 실시간 브릿지와 드라이버 중재 검증
//!
//! 스텁 연결로 수신 이벤트를 흘려보내 join 전송, LLM 스트리밍 누적,
//! 완료 신호의 단일성, 실시간 이벤트 도착 후 시뮬레이션 신호 폐기를
//! 확인합니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use nutriscan_lib::analysis_engine::driver::{DriverGuard, DriverKind, SubmissionHandler};
use nutriscan_lib::analysis_engine::events::{
    AnalysisProgressPayload, FileMeta, InboundEvent, LlmResponse, OutboundEvent, ProgressSignal,
    ProgressStep,
};
use nutriscan_lib::analysis_engine::realtime::{
    RealtimeBridge, RealtimeConnection, RealtimeError, RecommendationOutputs,
};
use nutriscan_lib::analysis_engine::simulation::SimulationSettings;
use nutriscan_lib::analysis_engine::stages::AnalysisStage;

struct StubConnection {
    available: AtomicBool,
    inbound_tx: broadcast::Sender<InboundEvent>,
    sent: Mutex<Vec<OutboundEvent>>,
}

impl StubConnection {
    fn new(available: bool) -> Arc<Self> {
        let (inbound_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            available: AtomicBool::new(available),
            inbound_tx,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, event: InboundEvent) {
        self.inbound_tx.send(event).unwrap();
    }

    fn sent_events(&self) -> Vec<OutboundEvent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RealtimeConnection for StubConnection {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn send(&self, event: OutboundEvent) -> Result<(), RealtimeError> {
        if !self.is_available() {
            return Err(RealtimeError::NotConnected);
        }
        self.sent.lock().unwrap().push(event);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<InboundEvent> {
        self.inbound_tx.subscribe()
    }

    fn session_id(&self) -> String {
        "session-test".to_string()
    }
}

fn progress(step: &str, percent: f64, message: &str) -> InboundEvent {
    InboundEvent::AnalysisProgress(AnalysisProgressPayload {
        step: step.to_string(),
        progress: percent,
        message: message.to_string(),
        current_file: None,
        total_files: None,
    })
}

fn spawn_bridge(
    connection: &Arc<StubConnection>,
    guard: &DriverGuard,
) -> (
    broadcast::Receiver<ProgressSignal>,
    Arc<Mutex<RecommendationOutputs>>,
    tokio::task::JoinHandle<()>,
) {
    let (signal_tx, signal_rx) = broadcast::channel(256);
    let outputs = Arc::new(Mutex::new(RecommendationOutputs::default()));
    let mut bridge = RealtimeBridge::new(
        Arc::clone(connection),
        signal_tx,
        guard.clone(),
        Arc::clone(&outputs),
    );
    let handle = tokio::spawn(async move { bridge.start().await });
    (signal_rx, outputs, handle)
}

#[tokio::test]
async fn connect_event_joins_the_analysis_session() {
    let connection = StubConnection::new(true);
    let guard = DriverGuard::new();
    let (_signal_rx, _outputs, handle) = spawn_bridge(&connection, &guard);

    connection.push(InboundEvent::Connect);
    // 브릿지가 이벤트를 소비할 시간을 준다
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let sent = connection.sent_events();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        OutboundEvent::JoinAnalysis { session_id } if session_id == "session-test"
    ));

    handle.abort();
}

#[tokio::test]
async fn first_realtime_progress_claims_the_panel() {
    let connection = StubConnection::new(true);
    let guard = DriverGuard::new();
    let (mut signal_rx, _outputs, handle) = spawn_bridge(&connection, &guard);

    assert!(guard.is_active(DriverKind::Simulation));

    connection.push(progress("ocr", 30.0, "이미지 1/2 분석 중..."));
    let signal = signal_rx.recv().await.unwrap();

    assert_eq!(signal.source, DriverKind::Realtime);
    assert_eq!(signal.stage(), Some(AnalysisStage::Ocr));
    assert!(guard.is_active(DriverKind::Realtime));
    assert!(!guard.is_active(DriverKind::Simulation));

    handle.abort();
}

#[tokio::test]
async fn unknown_step_still_emits_a_label_signal() {
    let connection = StubConnection::new(true);
    let guard = DriverGuard::new();
    let (mut signal_rx, _outputs, handle) = spawn_bridge(&connection, &guard);

    connection.push(progress("preprocessing", 40.0, "이미지 전처리 중..."));
    let signal = signal_rx.recv().await.unwrap();

    assert_eq!(signal.source, DriverKind::Realtime);
    assert_eq!(signal.stage(), None);
    assert_eq!(
        signal.step,
        ProgressStep::Unknown("preprocessing".to_string())
    );
    assert_eq!(signal.message, "이미지 전처리 중...");
    // 매핑 불가 단계도 실시간 이벤트이므로 패널을 점유한다
    assert!(guard.is_active(DriverKind::Realtime));

    handle.abort();
}

#[tokio::test]
async fn llm_chunks_stream_and_complete_replaces_once() {
    let connection = StubConnection::new(true);
    let guard = DriverGuard::new();
    let (mut signal_rx, outputs, handle) = spawn_bridge(&connection, &guard);

    connection.push(InboundEvent::LlmResponse(LlmResponse::Chunk {
        data: "단백질 섭취를 ".to_string(),
    }));
    connection.push(InboundEvent::LlmResponse(LlmResponse::Chunk {
        data: "늘리세요".to_string(),
    }));
    connection.push(InboundEvent::LlmResponse(LlmResponse::Complete {
        full_response: Some("단백질 섭취를 늘리세요.".to_string()),
        data: None,
    }));

    let signal = signal_rx.recv().await.unwrap();
    assert!(signal.is_terminal());
    assert_eq!(signal.message, "모든 분석이 완료되었습니다!");

    // 완료 신호는 하나뿐
    assert!(matches!(
        signal_rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));

    let outputs = outputs.lock().unwrap();
    assert_eq!(outputs.male.content(), "단백질 섭취를 늘리세요.");
    assert_eq!(outputs.female.content(), "단백질 섭취를 늘리세요.");

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn submission_falls_back_to_simulation_when_offline() {
    let connection = StubConnection::new(false);
    let guard = DriverGuard::new();
    let (signal_tx, mut signal_rx) = broadcast::channel(2048);
    let handler = SubmissionHandler::new(
        Arc::clone(&connection),
        signal_tx,
        guard.clone(),
        SimulationSettings::default(),
    );

    let files = vec![FileMeta::new("label.jpg", 120_000, "image/jpeg")];
    handler.start_analysis(files).await.unwrap();

    // 채널 송신이 한 번도 없었고 시뮬레이션이 종단까지 돌았다
    assert!(connection.sent_events().is_empty());
    let mut saw_terminal = false;
    while let Ok(signal) = signal_rx.try_recv() {
        assert_eq!(signal.source, DriverKind::Simulation);
        saw_terminal |= signal.is_terminal();
    }
    assert!(saw_terminal);
    assert!(guard.is_active(DriverKind::Simulation));
}

#[tokio::test(start_paused = true)]
async fn submission_hands_off_to_realtime_after_upload() {
    let connection = StubConnection::new(true);
    let guard = DriverGuard::new();
    let (signal_tx, mut signal_rx) = broadcast::channel(2048);
    let handler = SubmissionHandler::new(
        Arc::clone(&connection),
        signal_tx,
        guard.clone(),
        SimulationSettings::default(),
    );

    let files = vec![FileMeta::new("label.jpg", 120_000, "image/jpeg")];
    handler.start_analysis(files.clone()).await.unwrap();

    let sent = connection.sent_events();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        OutboundEvent::StartAnalysis { files: f } if f.len() == files.len()
    ));

    // 업로드 단계만 시뮬레이션으로 표시되었다
    let mut stages = Vec::new();
    while let Ok(signal) = signal_rx.try_recv() {
        stages.push(signal.stage());
    }
    assert!(stages.iter().all(|s| *s == Some(AnalysisStage::Upload)));
}
