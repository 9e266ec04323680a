//! 영양소 레지스트리
//!
//! 이미지 상세 모달의 영양정보 표가 사용하는 정적 영양소 목록입니다.
//! 표시 순서, 한국어 이름, 단위, 성인 남성 일일권장량을 담습니다.
//! 트랜스지방과 당류는 권장 기준치가 없어 백분율을 표시하지 않습니다.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// 영양소 하나의 정적 정보
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutrient {
    /// 파싱된 필드 키 (예: `calories_kcal`)
    pub key: &'static str,
    /// 한국어 표시 이름
    pub name_ko: &'static str,
    /// 표시 단위
    pub unit: &'static str,
    /// 성인 남성 일일권장량 (기준치 없는 영양소는 `None`)
    pub rdi: Option<f64>,
}

/// 표시 순서대로의 전체 영양소 목록
pub const NUTRIENTS: [Nutrient; 19] = [
    Nutrient { key: "calories_kcal", name_ko: "칼로리", unit: "kcal", rdi: Some(2500.0) },
    Nutrient { key: "carbs_g", name_ko: "탄수화물", unit: "g", rdi: Some(324.0) },
    Nutrient { key: "protein_g", name_ko: "단백질", unit: "g", rdi: Some(65.0) },
    Nutrient { key: "fat_g", name_ko: "지방", unit: "g", rdi: Some(83.0) },
    Nutrient { key: "saturated_fat_g", name_ko: "포화지방", unit: "g", rdi: Some(28.0) },
    Nutrient { key: "trans_fat_g", name_ko: "트랜스지방", unit: "g", rdi: None },
    Nutrient { key: "cholesterol_mg", name_ko: "콜레스테롤", unit: "mg", rdi: Some(300.0) },
    Nutrient { key: "sodium_mg", name_ko: "나트륨", unit: "mg", rdi: Some(2000.0) },
    Nutrient { key: "potassium_mg", name_ko: "칼륨", unit: "mg", rdi: Some(3500.0) },
    Nutrient { key: "fiber_g", name_ko: "식이섬유", unit: "g", rdi: Some(30.0) },
    Nutrient { key: "sugars_g", name_ko: "당류", unit: "g", rdi: None },
    Nutrient { key: "calcium_mg", name_ko: "칼슘", unit: "mg", rdi: Some(750.0) },
    Nutrient { key: "iron_mg", name_ko: "철분", unit: "mg", rdi: Some(10.0) },
    Nutrient { key: "phosphorus_mg", name_ko: "인", unit: "mg", rdi: Some(700.0) },
    Nutrient { key: "vitamin_a_ug", name_ko: "비타민A", unit: "μg", rdi: Some(800.0) },
    Nutrient { key: "thiamine_mg", name_ko: "티아민", unit: "mg", rdi: Some(1.2) },
    Nutrient { key: "riboflavin_mg", name_ko: "리보플라빈", unit: "mg", rdi: Some(1.4) },
    Nutrient { key: "niacin_mg", name_ko: "나이아신", unit: "mg", rdi: Some(16.0) },
    Nutrient { key: "vitamin_c_mg", name_ko: "비타민C", unit: "mg", rdi: Some(100.0) },
];

static NUTRIENT_INDEX: Lazy<HashMap<&'static str, &'static Nutrient>> =
    Lazy::new(|| NUTRIENTS.iter().map(|n| (n.key, n)).collect());

/// 필드 키로 영양소 조회
#[must_use]
pub fn lookup(key: &str) -> Option<&'static Nutrient> {
    NUTRIENT_INDEX.get(key).copied()
}

/// 일일권장량 대비 백분율 (반올림 정수)
#[must_use]
pub fn percent_of_rdi(value: f64, rdi: f64) -> i64 {
    ((value / rdi) * 100.0).round() as i64
}
