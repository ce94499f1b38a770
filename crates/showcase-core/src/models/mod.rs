//! 도메인 모델.
//!
//! 미디어 요소 상태/이벤트, 그룹 형태, 모델 뷰어 이벤트.

pub mod layout;
pub mod media;
pub mod viewer;
