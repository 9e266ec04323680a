//! 시뮬레이션 드라이버
//!
//! 실시간 채널이 없을 때 UI를 살아 있게 유지하는 폴백 전용 합성 진행
//! 생성기입니다. 수치는 실제 작업에서 유도된 것이 아니며, 업로드 → OCR →
//! 영양정보 → AI 추천 → 완료 순서의 타이머 체인으로 서버 처리 단계를
//! 흉내냅니다. 모든 대기 지점에서 취소 가능합니다.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::analysis_engine::driver::DriverKind;
use crate::analysis_engine::events::{FileMeta, ProgressSignal};
use crate::analysis_engine::stages::AnalysisStage;

pub use crate::infrastructure::config::SimulationSettings;

/// AI 추천 단계의 순환 상태 메시지 (진행 비율로 선택)
const LLM_STATUS_MESSAGES: [&str; 4] = [
    "AI 모델 로딩...",
    "부족 영양소 분석...",
    "맞춤형 추천 생성...",
    "결과 검증 중...",
];

/// 타이머 기반 합성 진행 드라이버
pub struct SimulationDriver {
    files: Vec<FileMeta>,
    signal_tx: broadcast::Sender<ProgressSignal>,
    settings: SimulationSettings,
    cancel: CancellationToken,
}

impl SimulationDriver {
    #[must_use]
    pub fn new(
        files: Vec<FileMeta>,
        signal_tx: broadcast::Sender<ProgressSignal>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            files,
            signal_tx,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// 드라이버 취소 토큰 (실시간 드라이버 전환 시 중단용)
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 업로드 단계 후 처리 단계까지 전체 체인 실행
    pub async fn run(&self) {
        self.run_upload().await;
        self.run_processing().await;
    }

    /// 업로드 단계: 고정 증분 타이머로 100%까지 전진
    ///
    /// 각 틱에서 `floor(percent/100 * 파일 수)`로 현재 업로드 중인 파일을
    /// 계산합니다. 완료 후 네트워크 안정화를 흉내내는 짧은 지연을 둡니다.
    pub async fn run_upload(&self) {
        let total = self.files.len();
        info!("📤 simulating upload progress for {total} files");

        self.emit(AnalysisStage::Upload, 0.0, "파일 업로드 시작...");

        let mut progress = 0.0_f64;
        loop {
            if !self.pause(Duration::from_millis(self.settings.upload_tick_ms)).await {
                return;
            }
            progress += self.settings.upload_increment;

            if progress >= 100.0 {
                self.emit(
                    AnalysisStage::Upload,
                    100.0,
                    format!("{total}개 파일 업로드 완료"),
                );
                break;
            }

            let file_index = ((progress / 100.0) * total as f64).floor() as usize;
            let display_index = file_index.min(total.saturating_sub(1));
            let name = self
                .files
                .get(display_index)
                .map_or("file", |f| f.name.as_str());
            self.emit(
                AnalysisStage::Upload,
                progress,
                format!("업로드 중: {name} ({}/{total})", file_index + 1),
            );
        }

        // 네트워크 안정화 지연 후 후속 단계로
        self.pause(Duration::from_millis(self.settings.upload_settle_ms))
            .await;
    }

    /// 처리 단계 체인: OCR → 영양정보 → AI 추천 → 완료
    pub async fn run_processing(&self) {
        let total = self.files.len();
        info!("⚙️ starting processing simulation for {total} files");

        if !self.run_ocr(total).await {
            return;
        }
        if !self.run_nutrition().await {
            return;
        }
        if !self.run_recommendation().await {
            return;
        }

        if !self.pause(Duration::from_millis(self.settings.complete_delay_ms)).await {
            return;
        }
        self.emit(AnalysisStage::Complete, 100.0, "모든 분석 완료!");
    }

    /// OCR 단계: 파일 수에 비례하는 선형 처리 시간
    async fn run_ocr(&self, total: usize) -> bool {
        if !self.pause(Duration::from_millis(self.settings.ocr_start_delay_ms)).await {
            return false;
        }
        self.emit(AnalysisStage::Ocr, 0.0, "OCR 분석 시작...");

        let duration_ms = total.max(1) as f64 * self.settings.ocr_ms_per_file as f64;
        let step = 100.0 / (duration_ms / self.settings.ocr_tick_ms as f64);
        let mut progress = 0.0_f64;

        loop {
            if !self.pause(Duration::from_millis(self.settings.ocr_tick_ms)).await {
                return false;
            }
            progress += step;

            if progress >= 100.0 {
                self.emit(AnalysisStage::Ocr, 100.0, format!("{total}개 파일 OCR 완료"));
                return true;
            }

            let file_index = ((progress / 100.0) * total as f64).floor() as usize;
            let current = (file_index + 1).min(total);
            self.emit(
                AnalysisStage::Ocr,
                progress.round(),
                format!("이미지 {current}/{total} 분석 중..."),
            );
        }
    }

    /// 영양정보 추출 단계: 고정된 짧은 멀티 틱 시퀀스
    async fn run_nutrition(&self) -> bool {
        if !self.pause(Duration::from_millis(self.settings.nutrition_start_delay_ms)).await {
            return false;
        }
        self.emit(AnalysisStage::Nutrition, 0.0, "영양정보 파싱 시작...");

        if !self.pause(Duration::from_millis(self.settings.nutrition_step_ms)).await {
            return false;
        }
        self.emit(AnalysisStage::Nutrition, 50.0, "영양성분 계산 중...");

        if !self.pause(Duration::from_millis(self.settings.nutrition_step_ms)).await {
            return false;
        }
        self.emit(AnalysisStage::Nutrition, 100.0, "영양정보 추출 완료");
        true
    }

    /// AI 추천 단계: 외부 서비스 지연을 흉내내는 무작위 증분
    async fn run_recommendation(&self) -> bool {
        if !self.pause(Duration::from_millis(self.settings.recommendation_start_delay_ms)).await {
            return false;
        }
        self.emit(AnalysisStage::Recommendation, 0.0, "LLM API 호출...");

        let span = self.settings.llm_increment_max - self.settings.llm_increment_min;
        let mut progress = 0.0_f64;

        loop {
            if !self.pause(Duration::from_millis(self.settings.recommendation_tick_ms)).await {
                return false;
            }
            progress += self.settings.llm_increment_min + fastrand::f64() * span;

            if progress >= 100.0 {
                self.emit(AnalysisStage::Recommendation, 100.0, "AI 추천 완료");
                return true;
            }

            let message_index =
                (((progress / 100.0) * LLM_STATUS_MESSAGES.len() as f64).floor() as usize)
                    .min(LLM_STATUS_MESSAGES.len() - 1);
            self.emit(
                AnalysisStage::Recommendation,
                progress.round(),
                LLM_STATUS_MESSAGES[message_index],
            );
        }
    }

    fn emit(&self, stage: AnalysisStage, percent: f64, message: impl Into<String>) {
        let signal = ProgressSignal::new(DriverKind::Simulation, stage, percent, message);
        if self.signal_tx.send(signal).is_err() {
            debug!("no active signal receivers, dropping simulated progress");
        }
    }

    /// 취소 가능한 대기. 취소되면 `false`.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => {
                debug!("simulation driver cancelled");
                false
            }
            () = tokio::time::sleep(duration) => true,
        }
    }
}
