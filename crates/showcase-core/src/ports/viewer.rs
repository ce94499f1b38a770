//! 3D 모델 뷰어 포트.
//!
//! 뷰어 자체(렌더링)는 외부 커스텀 엘리먼트이며, 여기서는 속성 설정과
//! 재생 제어만 다룬다.

use std::sync::Arc;

use crate::error::CoreError;
use crate::models::viewer::ViewerEvent;

/// 공유 뷰어 참조
pub type ViewerRef = Arc<dyn ModelViewer>;

/// 공유 버튼 참조
pub type ButtonRef = Arc<dyn ControlButton>;

/// 뷰어 이벤트 리스너
pub type ViewerListener = Arc<dyn Fn(&dyn ModelViewer, ViewerEvent) + Send + Sync>;

/// 버튼 클릭 리스너
pub type ClickListener = Arc<dyn Fn() + Send + Sync>;

/// 모델 뷰어 엘리먼트
pub trait ModelViewer: Send + Sync {
    /// 요소 ID
    fn id(&self) -> &str;

    /// HTML 속성 설정 (값이 없는 불리언 속성은 빈 문자열)
    fn set_attribute(&self, name: &str, value: &str);

    /// 애니메이션 재생
    fn play(&self);

    /// 애니메이션 일시정지
    fn pause(&self);

    /// 애니메이션 시간 배율
    fn set_time_scale(&self, scale: f64);

    /// 이벤트 리스너 등록
    fn subscribe(&self, listener: ViewerListener);
}

/// 재생/일시정지 버튼
pub trait ControlButton: Send + Sync {
    /// `data-viewer` 속성 (대상 뷰어 ID)
    fn target_viewer(&self) -> Option<String>;

    /// 버튼 텍스트 변경
    fn set_label(&self, label: &str);

    /// 클릭 리스너 등록
    fn on_click(&self, listener: ClickListener);
}

/// 뷰어/버튼을 만들고 찾는 호스트
pub trait ViewerHost: Send + Sync {
    /// 컨테이너 안에 새 뷰어 생성. 컨테이너가 없으면 `NotFound`.
    fn create_viewer(&self, container: &str) -> Result<ViewerRef, CoreError>;

    /// 컨테이너 안에 새 버튼 생성
    fn create_button(&self, container: &str, label: &str) -> Result<ButtonRef, CoreError>;

    /// 페이지의 모든 뷰어
    fn viewers(&self) -> Vec<ViewerRef>;

    /// ID로 뷰어 조회
    fn viewer_by_id(&self, id: &str) -> Option<ViewerRef>;

    /// 재생/일시정지 컨트롤로 표시된 버튼들
    fn play_pause_buttons(&self) -> Vec<ButtonRef>;
}
