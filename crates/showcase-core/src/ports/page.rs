//! 페이지 문서 포트.
//!
//! 구현: 브라우저 DOM 바인딩 또는 `showcase-runtime::sim::MemoryPage`.
//! 섹션 스캔 결과(`SectionLayout`)는 셋업 시점에 한 번 만들어지고 이후 고정된다.

use std::sync::Arc;

use crate::config::SectionConfig;
use crate::ports::media::MediaRef;

/// DOM 변경 알림 콜백
pub type MutationCallback = Arc<dyn Fn() + Send + Sync>;

/// 세트 버튼 클릭 핸들러. 버튼의 `data-set` 값이 전달된다.
pub type SetClickHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// 한 세트의 스캔 결과
#[derive(Clone)]
pub struct SetLayout {
    /// 세트 식별자 (`data-set` 값)
    pub id: String,
    /// 세트 안의 행 (문서 순서)
    pub rows: Vec<Vec<MediaRef>>,
    /// 세트 안의 모든 비디오 (행에 속하지 않은 것 포함)
    pub videos: Vec<MediaRef>,
}

/// 한 섹션의 스캔 결과
#[derive(Clone, Default)]
pub struct SectionLayout {
    /// 상호 배타적 세트 (세트 전환이 없는 섹션은 비어 있음)
    pub sets: Vec<SetLayout>,
    /// 세트 밖에 있는 행
    pub rows: Vec<Vec<MediaRef>>,
    /// 트리거 버튼의 `data-set` 값 (문서 순서)
    pub buttons: Vec<String>,
    /// 컨테이너 안의 모든 비디오
    pub videos: Vec<MediaRef>,
}

/// 페이지 문서 인터페이스
pub trait PageDocument: Send + Sync {
    /// 섹션 구조 스캔. 컨테이너가 없으면 `None`.
    fn section_layout(&self, section: &SectionConfig) -> Option<SectionLayout>;

    /// 선택자에 해당하는 컨테이너 하위의 비디오
    fn videos_in(&self, selector: &str) -> Vec<MediaRef>;

    /// 페이지의 모든 비디오
    fn all_videos(&self) -> Vec<MediaRef>;

    /// 선택자에 해당하는 컨테이너들의 하위 트리 변경 감시.
    ///
    /// 감시를 시작한 컨테이너 수를 반환한다 (0이면 아직 컨테이너가 없음).
    fn observe_mutations(&self, selectors: &[String], callback: MutationCallback) -> usize;

    /// 모든 변경 감시 해제
    fn disconnect_observers(&self);

    /// 섹션의 세트 버튼 클릭 핸들러 등록
    fn on_set_button_click(&self, section: &SectionConfig, handler: SetClickHandler);
}

/// 세트/버튼 활성 표시 인터페이스
pub trait SetView: Send + Sync {
    /// 세트 활성 클래스 토글
    fn mark_set(&self, section: &str, set_id: &str, active: bool);

    /// 버튼 활성 클래스 토글
    fn mark_button(&self, section: &str, set_id: &str, active: bool);
}
