//! # showcase-runtime
//!
//! 코어 포트의 런타임 어댑터.
//!
//! - [`scheduler`] — 단조 시계, tokio/가상 시간 스케줄러
//! - [`debounce`] — 취소 가능한 디바운스 타이머
//! - [`sim`] — 인메모리 페이지/비디오/모델 뷰어 시뮬레이션

pub mod debounce;
pub mod scheduler;
pub mod sim;

pub use debounce::Debouncer;
pub use scheduler::{ManualScheduler, SystemClock, TokioScheduler};
