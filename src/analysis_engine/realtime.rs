//! 실시간 브릿지
//!
//! 채널에서 수신한 이벤트를 진행 렌더러 호출로 변환하는 어댑터입니다.
//! 연결 객체는 페이지 세션당 한 번 생성되어 명시적으로 주입되며, 모듈
//! 전역 상태를 두지 않습니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::analysis_engine::driver::{DriverGuard, DriverKind};
use crate::analysis_engine::events::{
    InboundEvent, LlmResponse, LlmStatus, OutboundEvent, ProgressSignal,
};
use crate::analysis_engine::stages::AnalysisStage;

/// 실시간 채널 오류
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("realtime channel is not connected")]
    NotConnected,

    #[error("failed to send {event} over realtime channel: {message}")]
    SendFailed { event: &'static str, message: String },
}

/// 실시간 연결 능력 표면
///
/// `is_available` / `send` / `subscribe`만 노출하는 작은 연결 관리자입니다.
/// 제출 핸들러는 이 표면만 보고 실시간과 시뮬레이션 중 하나를 선택합니다.
#[async_trait]
pub trait RealtimeConnection: Send + Sync + 'static {
    /// 연결이 살아 있는지 (끊기면 제출 핸들러가 시뮬레이션으로 폴백)
    fn is_available(&self) -> bool;

    /// 이벤트 송신
    async fn send(&self, event: OutboundEvent) -> Result<(), RealtimeError>;

    /// 수신 이벤트 구독
    fn subscribe(&self) -> broadcast::Receiver<InboundEvent>;

    /// 이 페이지 세션의 식별자
    fn session_id(&self) -> String;
}

/// 출력 영역 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputState {
    /// 스트리밍 수신 중
    #[default]
    Streaming,
    /// 완료된 응답 표시
    Final,
    /// 인라인 오류 표시
    Error,
}

/// 추천 출력 영역 하나 (남성/여성 기준)
#[derive(Debug, Clone, Default)]
pub struct OutputRegion {
    content: String,
    state: OutputState,
    status: Option<LlmStatus>,
}

impl OutputRegion {
    /// 스트리밍 조각 추가
    pub fn append_chunk(&mut self, chunk: &str) {
        self.status = None;
        self.state = OutputState::Streaming;
        self.content.push_str(chunk);
    }

    /// 완료된 응답으로 교체
    pub fn replace(&mut self, content: &str) {
        self.status = None;
        self.state = OutputState::Final;
        self.content = content.to_string();
    }

    /// 인라인 오류 블록으로 교체
    pub fn set_error(&mut self, message: &str) {
        self.status = None;
        self.state = OutputState::Error;
        self.content = message.to_string();
    }

    /// 상태(타이핑) 표시 갱신
    pub fn set_status(&mut self, status: LlmStatus) {
        self.status = Some(status);
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn state(&self) -> OutputState {
        self.state
    }

    #[must_use]
    pub fn status(&self) -> Option<LlmStatus> {
        self.status
    }

    /// 표시용 HTML (개행 → `<br>`, 오류는 인라인 오류 블록)
    #[must_use]
    pub fn to_html(&self) -> String {
        let body = self.content.replace('\n', "<br>");
        match self.state {
            OutputState::Error => format!("<div class=\"recommendation-error\">{body}</div>"),
            OutputState::Streaming | OutputState::Final => match self.status {
                Some(status) => format!("{body}<span class=\"typing\">{}</span>", status.indicator_text()),
                None => body,
            },
        }
    }
}

/// 남성/여성 기준 추천 출력 영역 묶음
#[derive(Debug, Clone, Default)]
pub struct RecommendationOutputs {
    pub male: OutputRegion,
    pub female: OutputRegion,
}

impl RecommendationOutputs {
    fn each(&mut self, f: impl Fn(&mut OutputRegion)) {
        f(&mut self.male);
        f(&mut self.female);
    }
}

/// 채널 이벤트를 렌더러 신호로 변환하는 브릿지
pub struct RealtimeBridge<C: RealtimeConnection> {
    connection: Arc<C>,
    inbound_rx: broadcast::Receiver<InboundEvent>,
    signal_tx: broadcast::Sender<ProgressSignal>,
    guard: DriverGuard,
    outputs: Arc<Mutex<RecommendationOutputs>>,
    is_active: Arc<AtomicBool>,
}

impl<C: RealtimeConnection> RealtimeBridge<C> {
    #[must_use]
    pub fn new(
        connection: Arc<C>,
        signal_tx: broadcast::Sender<ProgressSignal>,
        guard: DriverGuard,
        outputs: Arc<Mutex<RecommendationOutputs>>,
    ) -> Self {
        let inbound_rx = connection.subscribe();
        Self {
            connection,
            inbound_rx,
            signal_tx,
            guard,
            outputs,
            is_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 브릿지 시작 - 수신 이벤트를 렌더러 신호로 전달
    pub async fn start(&mut self) {
        if self.is_active.swap(true, Ordering::SeqCst) {
            warn!("RealtimeBridge is already running");
            return;
        }

        info!("🌉 starting realtime bridge for session {}", self.connection.session_id());

        while self.is_active.load(Ordering::SeqCst) {
            match self.inbound_rx.recv().await {
                Ok(event) => self.handle_inbound(event).await,
                Err(broadcast::error::RecvError::Closed) => {
                    info!("inbound channel closed, stopping realtime bridge");
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("realtime bridge lagged, skipped {skipped} events");
                    continue;
                }
            }
        }

        self.is_active.store(false, Ordering::SeqCst);
        info!("🌉 realtime bridge stopped");
    }

    /// 브릿지 중지
    pub fn stop(&self) {
        self.is_active.store(false, Ordering::SeqCst);
    }

    /// 브릿지 상태 확인
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    async fn handle_inbound(&self, event: InboundEvent) {
        match event {
            InboundEvent::Connect => {
                let join = OutboundEvent::JoinAnalysis {
                    session_id: self.connection.session_id(),
                };
                if let Err(e) = self.connection.send(join).await {
                    error!("failed to join analysis session: {e}");
                }
            }
            InboundEvent::Disconnect => {
                // 가용성 플래그는 연결 구현체가 내리며, 제출 핸들러가
                // 다음 제출에서 시뮬레이션으로 폴백한다.
                info!("realtime channel disconnected");
            }
            InboundEvent::AnalysisProgress(payload) => {
                debug!(
                    "📡 analysis progress: step={} progress={} message={}",
                    payload.step, payload.progress, payload.message
                );
                // 실제 이벤트가 도착하는 순간 시뮬레이션 갱신은 버려진다
                self.guard.claim_realtime();

                match AnalysisStage::from_wire(&payload.step) {
                    Some(stage) => self.forward(stage, payload.progress, payload.message),
                    None => {
                        warn!("unknown analysis step '{}', label-only update", payload.step);
                        self.forward_raw(payload.step, payload.progress, payload.message);
                    }
                }
            }
            InboundEvent::LlmResponse(response) => self.handle_llm_response(response),
        }
    }

    fn handle_llm_response(&self, response: LlmResponse) {
        if let Some(status) = response.as_status() {
            self.with_outputs(|o| o.each(|r| r.set_status(status)));
            return;
        }

        match response {
            LlmResponse::Chunk { data } => {
                self.with_outputs(|o| o.each(|r| r.append_chunk(&data)));
            }
            LlmResponse::Complete { full_response, data } => {
                let content = full_response.or(data).unwrap_or_default();
                self.with_outputs(|o| o.each(|r| r.replace(&content)));
                self.guard.claim_realtime();
                self.forward(
                    AnalysisStage::Complete,
                    100.0,
                    "모든 분석이 완료되었습니다!".to_string(),
                );
            }
            LlmResponse::Error { data } => {
                error!("LLM error surfaced inline: {data}");
                self.with_outputs(|o| o.each(|r| r.set_error(&data)));
            }
            // 상태 변형은 위에서 처리됨
            LlmResponse::Thinking { .. }
            | LlmResponse::Connecting { .. }
            | LlmResponse::Generating { .. }
            | LlmResponse::Responding { .. } => {}
        }
    }

    fn forward(&self, stage: AnalysisStage, percent: f64, message: String) {
        let signal = ProgressSignal::new(DriverKind::Realtime, stage, percent, message);
        if self.signal_tx.send(signal).is_err() {
            debug!("no active signal receivers, dropping realtime progress");
        }
    }

    fn forward_raw(&self, step: String, percent: f64, message: String) {
        // 알 수 없는 단계도 라벨 갱신은 보존한다. 원문 식별자를 실은 신호를
        // 보내면 패널 브릿지가 라벨 전용 렌더링 경로로 처리한다.
        let signal = ProgressSignal::unmapped(DriverKind::Realtime, step, percent, message);
        if self.signal_tx.send(signal).is_err() {
            debug!("no active signal receivers, dropping realtime progress");
        }
    }

    fn with_outputs(&self, f: impl FnOnce(&mut RecommendationOutputs)) {
        match self.outputs.lock() {
            Ok(mut outputs) => f(&mut outputs),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
