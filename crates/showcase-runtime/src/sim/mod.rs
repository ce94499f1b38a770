//! 인메모리 호스트 시뮬레이션.
//!
//! 브라우저 없이 동기화/세트 전환 로직을 구동하기 위한 어댑터.
//! 테스트와 `showcase-replay`에서 사용한다.

pub mod page;
pub mod video;
pub mod viewer;

pub use page::{MemoryPage, PageFixture, VideoFixture};
pub use video::SimulatedVideo;
pub use viewer::{MemoryViewerHost, SimulatedButton, SimulatedViewer};
