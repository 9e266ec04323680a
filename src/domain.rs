//! Domain module - Core business logic and entities
//!
//! 영양소 레지스트리와 이미지 갤러리 등 분석 결과 화면의
//! 도메인 모델을 담습니다.

pub mod nutrition;
pub mod gallery;

// Re-export commonly used items
pub use gallery::{ImageAnalysis, ImageDetailModal, ImageStatus, ModalBody};
pub use nutrition::{Nutrient, NUTRIENTS};
