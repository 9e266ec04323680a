//! 갤러리 상세 모달 검증
//!
//! 상태별 모달 본문 선택과 영양정보 표의 기준치 백분율 계산을 확인합니다.

use rstest::rstest;

use nutriscan_lib::domain::gallery::{
    ImageAnalysis, ImageDetailModal, ImageStatus, ModalBody,
};

fn analysis(status: ImageStatus, nutrition_json: Option<&str>) -> ImageAnalysis {
    ImageAnalysis {
        filename: "label.jpg".to_string(),
        status,
        nutrition_json: nutrition_json.map(str::to_string),
        full_package_json: None,
        image_url: None,
        error_message: None,
    }
}

#[rstest]
#[case(ImageStatus::Success, "분석 완료", "#22c55e")]
#[case(ImageStatus::Pass, "분석 실패 (PASS)", "#f59e0b")]
#[case(ImageStatus::Error, "오류 발생", "#ef4444")]
fn badge_label_and_color_follow_status(
    #[case] status: ImageStatus,
    #[case] label: &str,
    #[case] color: &str,
) {
    assert_eq!(status.label(), label);
    assert_eq!(status.badge_color(), color);
}

#[test]
fn success_modal_lists_recognized_nutrients_in_registry_order() {
    let modal = ImageDetailModal::from_analysis(&analysis(
        ImageStatus::Success,
        Some(r#"{"sodium_mg": 1000, "calories_kcal": 500, "protein_g": 13.0}"#),
    ));

    let ModalBody::NutritionTable { rows } = modal.body else {
        panic!("expected nutrition table");
    };
    // 인식된 세 영양소만, 레지스트리 순서대로
    let names: Vec<&str> = rows.iter().map(|r| r.name_ko).collect();
    assert_eq!(names, vec!["칼로리", "단백질", "나트륨"]);

    // 칼로리 500/2500 → 20%, 단백질 13/65 → 20%, 나트륨 1000/2000 → 50%
    let by_name = |name: &str| rows.iter().find(|r| r.name_ko == name).unwrap();
    assert_eq!(by_name("칼로리").rdi_percent, Some(20));
    assert_eq!(by_name("단백질").rdi_percent, Some(20));
    assert_eq!(by_name("나트륨").rdi_percent, Some(50));
}

#[test]
fn amounts_join_value_and_unit_without_a_space() {
    let mut success = analysis(
        ImageStatus::Success,
        Some(r#"{"sodium_mg": 500, "protein_g": 12.5}"#),
    );
    success.full_package_json = Some(r#"{"sodium_mg": 1500, "protein_g": 37.5}"#.to_string());

    let modal = ImageDetailModal::from_analysis(&success);
    let ModalBody::NutritionTable { rows } = modal.body else {
        panic!("expected nutrition table");
    };
    let by_name = |name: &str| rows.iter().find(|r| r.name_ko == name).unwrap();
    assert_eq!(by_name("나트륨").per_100g, "500mg");
    assert_eq!(by_name("나트륨").full_package, "1500mg");
    assert_eq!(by_name("단백질").per_100g, "12.5g");
    assert_eq!(by_name("단백질").full_package, "37.5g");
}

#[test]
fn pass_and_error_pick_their_own_bodies() {
    let pass = ImageDetailModal::from_analysis(&analysis(ImageStatus::Pass, None));
    assert_eq!(pass.body, ModalBody::OcrFailed);

    let mut errored = analysis(ImageStatus::Error, None);
    errored.error_message = Some("OCR 서비스 시간 초과".to_string());
    let error = ImageDetailModal::from_analysis(&errored);
    assert_eq!(
        error.body,
        ModalBody::Unavailable {
            reason: "OCR 서비스 시간 초과".to_string()
        }
    );
}

#[rstest]
#[case(Some("{broken"))]
#[case(Some("[1, 2, 3"))]
#[case(None)]
fn unparseable_nutrition_degrades_to_notice(#[case] raw: Option<&str>) {
    let modal = ImageDetailModal::from_analysis(&analysis(ImageStatus::Success, raw));
    assert!(matches!(modal.body, ModalBody::Unavailable { .. }));
}

#[test]
fn wire_payload_round_trips_through_serde() {
    let raw = r#"{
        "filename": "front.jpg",
        "status": "success",
        "nutrition_json": "{\"sodium_mg\": 700}",
        "full_package_json": "{\"sodium_mg\": 2100}",
        "image_url": "/uploads/front.jpg"
    }"#;
    let analysis: ImageAnalysis = serde_json::from_str(raw).unwrap();
    assert_eq!(analysis.status, ImageStatus::Success);

    let modal = ImageDetailModal::from_analysis(&analysis);
    assert_eq!(modal.image_url.as_deref(), Some("/uploads/front.jpg"));
    let ModalBody::NutritionTable { rows } = modal.body else {
        panic!("expected nutrition table");
    };
    let sodium = rows.iter().find(|r| r.name_ko == "나트륨").unwrap();
    assert_eq!(sodium.rdi_percent, Some(35));
    assert_eq!(sodium.per_100g, "700mg");
    assert_eq!(sodium.full_package, "2100mg");
}
