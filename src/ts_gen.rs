//! TypeScript 타입 생성을 위한 유틸리티
//!
//! ts-rs를 활용해 프론트엔드와 백엔드 간 타입 동기화를 위한
//! TS 파일을 생성합니다.

use ts_rs::TS;

/// TypeScript 바인딩 생성 함수
pub fn generate_ts_bindings() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = "../src/types/";

    // 분석 진행 이벤트 타입들
    crate::analysis_engine::stages::AnalysisStage::export_all_to(out_dir)?;
    crate::analysis_engine::events::AnalysisProgressPayload::export_all_to(out_dir)?;
    crate::analysis_engine::events::LlmResponse::export_all_to(out_dir)?;
    crate::analysis_engine::events::LlmStatus::export_all_to(out_dir)?;
    crate::analysis_engine::events::FileMeta::export_all_to(out_dir)?;
    crate::analysis_engine::events::OutboundEvent::export_all_to(out_dir)?;

    // 갤러리 / 모달 타입들
    crate::domain::gallery::ImageStatus::export_all_to(out_dir)?;
    crate::domain::gallery::ImageAnalysis::export_all_to(out_dir)?;
    crate::domain::gallery::ImageDetailModal::export_all_to(out_dir)?;
    crate::domain::gallery::ModalBody::export_all_to(out_dir)?;
    crate::domain::gallery::NutritionRow::export_all_to(out_dir)?;

    println!("TypeScript bindings generated successfully!");
    Ok(())
}
