//! 이미지 갤러리 도메인
//!
//! 분석 결과 화면의 이미지별 상태 배지와 상세 모달 모델입니다.
//! 서버가 내려준 이미지별 분석 결과(JSON 문자열로 직렬화된 영양정보 포함)를
//! 화면에 그릴 수 있는 구조로 변환합니다.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::nutrition::{self, NUTRIENTS};

/// 이미지 한 장의 분석 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ImageStatus {
    /// 영양성분표 인식 및 파싱 성공
    Success,
    /// OCR은 돌았지만 영양성분표를 찾지 못함
    Pass,
    /// 처리 중 오류 발생
    Error,
}

impl ImageStatus {
    /// 배지에 표시할 한국어 레이블
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "분석 완료",
            Self::Pass => "분석 실패 (PASS)",
            Self::Error => "오류 발생",
        }
    }

    /// 배지 색상 (CSS hex)
    #[must_use]
    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::Success => "#22c55e",
            Self::Pass => "#f59e0b",
            Self::Error => "#ef4444",
        }
    }
}

/// 서버가 내려주는 이미지별 분석 결과
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImageAnalysis {
    pub filename: String,
    pub status: ImageStatus,
    /// 100g 기준 영양정보 JSON 문자열. 성공 상태일 때만 채워집니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_json: Option<String>,
    /// 전체 패키지 기준 영양정보 JSON 문자열
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_package_json: Option<String>,
    /// 원본 이미지 미리보기 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 오류 상태일 때의 원인 메시지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// 영양정보 표의 한 행 (영양소 / 100g당 / 전체 패키지 / % 기준치)
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct NutritionRow {
    pub name_ko: &'static str,
    /// 100g당 함량, "123.4g" 형태
    pub per_100g: String,
    /// 전체 패키지 함량. 패키지 값이 없으면 "-"
    pub full_package: String,
    /// 100g당 값의 일일권장량 대비 백분율. 기준치 없는 영양소는 `None`
    pub rdi_percent: Option<i64>,
}

/// 상세 모달 본문
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum ModalBody {
    /// 영양정보 표 (인식된 영양소만, 레지스트리 순서대로)
    NutritionTable { rows: Vec<NutritionRow> },
    /// OCR이 영양성분표를 찾지 못한 경우
    OcrFailed,
    /// 오류 또는 영양정보 파싱 실패
    Unavailable { reason: String },
}

/// 이미지 상세 모달 모델
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ImageDetailModal {
    pub filename: String,
    pub status: ImageStatus,
    /// 미리보기 이미지 URL. 없으면 프론트가 플레이스홀더를 그립니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub body: ModalBody,
}

impl ImageDetailModal {
    /// 분석 결과를 모달 모델로 변환
    ///
    /// 영양정보 JSON이 깨져 있으면 경고 로그를 남기고 안내 본문으로
    /// 대체합니다. 모달이 열리지 않는 것보다 낫습니다.
    #[must_use]
    pub fn from_analysis(analysis: &ImageAnalysis) -> Self {
        let body = match analysis.status {
            ImageStatus::Pass => ModalBody::OcrFailed,
            ImageStatus::Error => ModalBody::Unavailable {
                reason: analysis
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "알 수 없는 오류".to_string()),
            },
            ImageStatus::Success => match &analysis.nutrition_json {
                Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                    Ok(values) => {
                        let package = analysis.full_package_json.as_deref().and_then(|raw| {
                            serde_json::from_str::<serde_json::Value>(raw)
                                .map_err(|e| {
                                    tracing::warn!(
                                        "⚠️ 전체 패키지 JSON 파싱 실패 ({}): {}",
                                        analysis.filename,
                                        e
                                    );
                                })
                                .ok()
                        });
                        ModalBody::NutritionTable {
                            rows: build_rows(&values, package.as_ref()),
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ 영양정보 JSON 파싱 실패 ({}): {}",
                            analysis.filename,
                            e
                        );
                        ModalBody::Unavailable {
                            reason: "영양정보를 해석할 수 없습니다".to_string(),
                        }
                    }
                },
                None => ModalBody::Unavailable {
                    reason: "영양정보가 없습니다".to_string(),
                },
            },
        };

        Self {
            filename: analysis.filename.clone(),
            status: analysis.status,
            image_url: analysis.image_url.clone(),
            body,
        }
    }
}

/// 100g 기준 값이 인식된 영양소만 행으로 만든다. 전체 패키지 값은 있으면
/// 같은 단위로 붙이고 없으면 "-", 기준치 백분율은 100g당 값으로 계산한다.
fn build_rows(
    values: &serde_json::Value,
    package: Option<&serde_json::Value>,
) -> Vec<NutritionRow> {
    NUTRIENTS
        .iter()
        .filter_map(|n| {
            let value = values.get(n.key).and_then(serde_json::Value::as_f64)?;
            let full_package = package
                .and_then(|p| p.get(n.key))
                .and_then(serde_json::Value::as_f64)
                .map_or_else(|| "-".to_string(), |v| format!("{v}{}", n.unit));
            let rdi_percent = n.rdi.map(|rdi| nutrition::percent_of_rdi(value, rdi));
            Some(NutritionRow {
                name_ko: n.name_ko,
                per_100g: format!("{value}{}", n.unit),
                full_package,
                rdi_percent,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(json: &str) -> ImageAnalysis {
        ImageAnalysis {
            filename: "label.jpg".to_string(),
            status: ImageStatus::Success,
            nutrition_json: Some(json.to_string()),
            full_package_json: None,
            image_url: None,
            error_message: None,
        }
    }

    #[test]
    fn success_builds_table_of_recognized_nutrients_only() {
        let modal = ImageDetailModal::from_analysis(&success(
            r#"{"sodium_mg": 500.0, "calories_kcal": 250}"#,
        ));
        let ModalBody::NutritionTable { rows } = modal.body else {
            panic!("expected table");
        };
        // 인식되지 않은 영양소는 행 자체가 없다
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.name_ko != "식이섬유"));

        let sodium = rows.iter().find(|r| r.name_ko == "나트륨").unwrap();
        assert_eq!(sodium.per_100g, "500mg");
        assert_eq!(sodium.rdi_percent, Some(25));
        // 패키지 정보가 없으면 전체 패키지 열은 대시
        assert_eq!(sodium.full_package, "-");
    }

    #[test]
    fn full_package_column_carries_package_amounts() {
        let mut analysis = success(r#"{"sodium_mg": 500.0, "sugars_g": 12.5}"#);
        analysis.full_package_json = Some(r#"{"sodium_mg": 1250.0}"#.to_string());
        analysis.image_url = Some("/uploads/label.jpg".to_string());

        let modal = ImageDetailModal::from_analysis(&analysis);
        assert_eq!(modal.image_url.as_deref(), Some("/uploads/label.jpg"));
        let ModalBody::NutritionTable { rows } = modal.body else {
            panic!("expected table");
        };
        let sodium = rows.iter().find(|r| r.name_ko == "나트륨").unwrap();
        assert_eq!(sodium.full_package, "1250mg");
        // 백분율은 전체 패키지가 아니라 100g당 값 기준
        assert_eq!(sodium.rdi_percent, Some(25));
        let sugars = rows.iter().find(|r| r.name_ko == "당류").unwrap();
        assert_eq!(sugars.full_package, "-");
    }

    #[test]
    fn malformed_json_falls_back_instead_of_failing() {
        let modal = ImageDetailModal::from_analysis(&success("{not json"));
        assert!(matches!(modal.body, ModalBody::Unavailable { .. }));
    }

    #[test]
    fn pass_status_shows_ocr_failure() {
        let analysis = ImageAnalysis {
            filename: "blurry.jpg".to_string(),
            status: ImageStatus::Pass,
            nutrition_json: None,
            full_package_json: None,
            image_url: None,
            error_message: None,
        };
        let modal = ImageDetailModal::from_analysis(&analysis);
        assert_eq!(modal.body, ModalBody::OcrFailed);
        assert_eq!(modal.status.label(), "분석 실패 (PASS)");
    }

    #[test]
    fn sugars_never_gets_a_percentage() {
        let modal = ImageDetailModal::from_analysis(&success(r#"{"sugars_g": 40.0}"#));
        let ModalBody::NutritionTable { rows } = modal.body else {
            panic!("expected table");
        };
        let sugars = rows.iter().find(|r| r.name_ko == "당류").unwrap();
        assert_eq!(sugars.per_100g, "40g");
        assert_eq!(sugars.rdi_percent, None);
    }
}
