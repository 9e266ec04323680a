//! 분석 파이프라인 단계 레지스트리
//!
//! 서버 측 분석 파이프라인의 고정된 단계 목록과 와이어 별칭 테이블을 정의합니다.
//! ts-rs를 통해 TypeScript 타입이 자동 생성됩니다.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 분석 파이프라인의 한 단계
///
/// 순서가 고정된 유한 집합입니다. 전체 진행률에서 각 단계의 가중치는
/// `100 / COUNT`로 동일합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStage {
    /// 파일 업로드
    Upload,
    /// OCR 분석
    Ocr,
    /// 영양정보 추출
    Nutrition,
    /// AI 추천 생성
    Recommendation,
    /// 분석 완료
    Complete,
}

impl AnalysisStage {
    /// 파이프라인 순서대로의 전체 단계
    pub const ALL: [Self; 5] = [
        Self::Upload,
        Self::Ocr,
        Self::Nutrition,
        Self::Recommendation,
        Self::Complete,
    ];

    /// 전체 단계 수
    pub const COUNT: usize = Self::ALL.len();

    /// 전체 진행률에서 단계 하나가 차지하는 가중치 (%)
    #[must_use]
    pub fn weight() -> f64 {
        100.0 / Self::COUNT as f64
    }

    /// 파이프라인 내 0 기반 인덱스
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Ocr => 1,
            Self::Nutrition => 2,
            Self::Recommendation => 3,
            Self::Complete => 4,
        }
    }

    /// 와이어 식별자 (`analysis_progress` 페이로드의 `step` 필드)
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Ocr => "ocr",
            Self::Nutrition => "nutrition",
            Self::Recommendation => "recommendation",
            Self::Complete => "complete",
        }
    }

    /// 진행 패널에서 단계 컨테이너가 사용하는 요소 식별자
    #[must_use]
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Upload => "step-upload",
            Self::Ocr => "step-ocr",
            Self::Nutrition => "step-nutrition",
            Self::Recommendation => "step-recommendation",
            Self::Complete => "step-complete",
        }
    }

    /// 와이어 별칭 테이블: `upload`와 `step-upload` 둘 다 허용
    #[must_use]
    pub fn from_wire(step: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.slug() == step || s.element_id() == step)
    }

    /// 단계별 로딩 텍스트
    #[must_use]
    pub fn loading_text(self) -> &'static str {
        match self {
            Self::Upload => "파일 업로드 중...",
            Self::Ocr => "OCR 분석 중...",
            Self::Nutrition => "영양정보 추출 중...",
            Self::Recommendation => "AI 추천 생성 중...",
            Self::Complete => "분석 완료!",
        }
    }

    /// 알 수 없는 단계에 대한 로딩 텍스트 폴백
    pub const FALLBACK_LOADING_TEXT: &'static str = "분석 중...";
}
