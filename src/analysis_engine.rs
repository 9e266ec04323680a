//! 분석 진행 엔진
//!
//! 파일 업로드부터 AI 추천까지의 분석 진행 상태를 하나의 파이프라인으로
//! 관리합니다. 시뮬레이션 드라이버와 실시간 드라이버가 동일한 진행 신호
//! 채널로 발행하고, 패널 브릿지가 소비해 화면 패치로 렌더링합니다.

pub mod stages;
pub mod events;
pub mod panel;
pub mod tracker;
pub mod driver;
pub mod simulation;
pub mod realtime;
pub mod session;
pub mod completion;
pub mod panel_bridge;

// Re-export commonly used items
pub use driver::{DriverGuard, DriverKind, SubmissionHandler};
pub use events::{AnalysisProgressPayload, InboundEvent, OutboundEvent, ProgressSignal};
pub use panel::{MemoryPanel, PanelPatch, PanelSink, StagePhase};
pub use panel_bridge::PanelBridge;
pub use stages::AnalysisStage;
pub use tracker::ProgressTracker;
