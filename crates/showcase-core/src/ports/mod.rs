//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 호스트 어댑터(브라우저 바인딩, 인메모리 시뮬레이션)가 이 trait들을 구현하며,
//! 상위 crate에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 모든 호출은 단일 스레드 협력형 콜백 모델을 전제로 동기적이다.

pub mod media;
pub mod page;
pub mod scheduler;
pub mod viewer;
