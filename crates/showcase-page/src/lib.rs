//! # showcase-page
//!
//! 설정과 페이지 포트로 쇼케이스 페이지 전체를 배선한다.
//!
//! - [`section`] — 섹션 하나를 스캔해 그룹 동기화기와 세트 전환기를 구성
//! - [`speed`] — 섹션별 재생 속도 적용과 DOM 변경 시 재적용
//! - [`hover`] — 마우스 호버 시에만 네이티브 컨트롤 표시
//! - [`viewer`] — 3D 모델 뷰어 생성과 재생/일시정지 컨트롤
//! - [`showcase`] — 페이지 전체 마운트

pub mod hover;
pub mod section;
pub mod showcase;
pub mod speed;
pub mod viewer;

pub use hover::HoverControls;
pub use section::{MountContext, MountedSection};
pub use showcase::Showcase;
pub use speed::{SpeedObserver, SpeedPolicy};
pub use viewer::{GlbViewer, GlbViewerOptions, PlayPauseControl, ViewerControls};
