//! 채널 이벤트 페이로드 정의
//!
//! 실시간 채널을 오가는 와이어 페이로드와 엔진 내부 브로드캐스트 신호를
//! 정의합니다. 와이어 타입은 ts-rs로 프론트엔드와 동기화됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::analysis_engine::driver::DriverKind;
use crate::analysis_engine::stages::AnalysisStage;

/// `analysis_progress` 이벤트 페이로드
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalysisProgressPayload {
    /// 단계 와이어 식별자 (별칭 테이블로 해석)
    pub step: String,
    /// 현재 단계 내 진행률 (0..=100)
    pub progress: f64,
    /// 사용자에게 보여줄 상태 메시지
    pub message: String,
    /// 현재 처리 중인 파일 번호 (1 기반, 선택적)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<u32>,
    /// 전체 파일 수 (선택적)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_files: Option<u32>,
}

/// LLM 스트리밍 상태 부분 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LlmStatus {
    Thinking,
    Connecting,
    Generating,
    Responding,
}

impl LlmStatus {
    /// 출력 영역 상태 표시 텍스트
    #[must_use]
    pub fn indicator_text(self) -> &'static str {
        match self {
            Self::Thinking => "생각하는 중...",
            Self::Connecting => "연결 중...",
            Self::Generating => "생성 중...",
            Self::Responding => "응답 중...",
        }
    }
}

/// `llm_response` 이벤트 페이로드
///
/// 와이어의 `{type, data, full_response}` 형태를 `type` 필드를 태그로 하는
/// 변형 타입으로 모델링하여 모든 경우를 빠짐없이 처리합니다.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LlmResponse {
    /// 실시간 텍스트 조각 - 출력 영역에 추가
    Chunk { data: String },
    /// 완료된 응답 - `full_response` 우선, 없으면 `data`로 대체
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        full_response: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    /// 업스트림 처리 실패 - 인라인 오류 블록으로 표시
    Error { data: String },
    /// 상태 표시 부분 단계
    Thinking {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    Connecting {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    Generating {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
    Responding {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
}

impl LlmResponse {
    /// 상태 부분 단계라면 해당 `LlmStatus` 반환
    #[must_use]
    pub fn as_status(&self) -> Option<LlmStatus> {
        match self {
            Self::Thinking { .. } => Some(LlmStatus::Thinking),
            Self::Connecting { .. } => Some(LlmStatus::Connecting),
            Self::Generating { .. } => Some(LlmStatus::Generating),
            Self::Responding { .. } => Some(LlmStatus::Responding),
            Self::Chunk { .. } | Self::Complete { .. } | Self::Error { .. } => None,
        }
    }
}

/// 업로드할 파일 메타데이터 (`start_analysis` 페이로드 항목)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl FileMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// 채널에서 수신하는 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum InboundEvent {
    Connect,
    Disconnect,
    AnalysisProgress(AnalysisProgressPayload),
    LlmResponse(LlmResponse),
}

/// 채널로 송신하는 이벤트
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
#[ts(export)]
pub enum OutboundEvent {
    JoinAnalysis { session_id: String },
    StartAnalysis { files: Vec<FileMeta> },
}

impl OutboundEvent {
    /// 와이어 채널 이벤트 이름
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinAnalysis { .. } => "join_analysis",
            Self::StartAnalysis { .. } => "start_analysis",
        }
    }
}

/// 진행 신호가 가리키는 단계
///
/// 별칭 테이블로 해석되지 않는 와이어 단계도 라벨 갱신 경로를 타야 하므로
/// 원문 식별자를 보존하는 변형을 둡니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStep {
    /// 파이프라인의 알려진 단계
    Stage(AnalysisStage),
    /// 해석 불가능한 와이어 단계 (원문 식별자 보존)
    Unknown(String),
}

/// 드라이버가 패널 브릿지로 발행하는 내부 진행 신호
///
/// 시뮬레이션과 실시간 양쪽 드라이버가 동일한 형태로 발행하며, 패널 브릿지가
/// 정확히 한 번 소비합니다. 보관되지 않습니다.
#[derive(Debug, Clone)]
pub struct ProgressSignal {
    /// 신호를 발행한 드라이버
    pub source: DriverKind,
    pub step: ProgressStep,
    pub percent: f64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ProgressSignal {
    #[must_use]
    pub fn new(
        source: DriverKind,
        stage: AnalysisStage,
        percent: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            step: ProgressStep::Stage(stage),
            percent,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// 별칭 테이블에 없는 와이어 단계에 대한 라벨 전용 신호
    #[must_use]
    pub fn unmapped(
        source: DriverKind,
        step: impl Into<String>,
        percent: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            step: ProgressStep::Unknown(step.into()),
            percent,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// 알려진 단계라면 해당 `AnalysisStage` 반환
    #[must_use]
    pub fn stage(&self) -> Option<AnalysisStage> {
        match &self.step {
            ProgressStep::Stage(stage) => Some(*stage),
            ProgressStep::Unknown(_) => None,
        }
    }

    /// 완료 단계 100% 도달 여부 (Completion Handler 트리거 조건)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.stage() == Some(AnalysisStage::Complete) && self.percent >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_response_parses_wire_type_tag() {
        let chunk: LlmResponse = serde_json::from_str(r#"{"type":"chunk","data":"단백질"}"#).unwrap();
        assert!(matches!(chunk, LlmResponse::Chunk { ref data } if data == "단백질"));

        let complete: LlmResponse =
            serde_json::from_str(r#"{"type":"complete","full_response":"전체 응답"}"#).unwrap();
        match complete {
            LlmResponse::Complete { full_response, data } => {
                assert_eq!(full_response.as_deref(), Some("전체 응답"));
                assert!(data.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let status: LlmResponse = serde_json::from_str(r#"{"type":"thinking"}"#).unwrap();
        assert_eq!(status.as_status(), Some(LlmStatus::Thinking));
    }

    #[test]
    fn file_meta_serializes_type_field() {
        let meta = FileMeta::new("label.png", 1024, "image/png");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "image/png");
        assert_eq!(json["name"], "label.png");
    }

    #[test]
    fn terminal_signal_requires_complete_at_100() {
        let sig = ProgressSignal::new(DriverKind::Realtime, AnalysisStage::Complete, 100.0, "");
        assert!(sig.is_terminal());
        let sig = ProgressSignal::new(DriverKind::Realtime, AnalysisStage::Complete, 99.0, "");
        assert!(!sig.is_terminal());
        let sig = ProgressSignal::new(DriverKind::Simulation, AnalysisStage::Ocr, 100.0, "");
        assert!(!sig.is_terminal());
        let sig = ProgressSignal::unmapped(DriverKind::Realtime, "postprocess", 100.0, "");
        assert!(!sig.is_terminal());
        assert_eq!(sig.stage(), None);
    }
}
