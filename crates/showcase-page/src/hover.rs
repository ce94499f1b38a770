//! 호버 시에만 네이티브 컨트롤 표시.

use showcase_core::models::media::MediaEvent;
use showcase_core::ports::media::MediaElement;
use showcase_core::ports::page::PageDocument;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 비디오 컨트롤 호버 토글
pub struct HoverControls;

impl HoverControls {
    /// 아직 설정되지 않은 모든 비디오의 컨트롤을 숨기고 호버 리스너를 건다.
    ///
    /// 새로 설정한 비디오 수를 반환한다. 요소별 설정 표식으로 한 번만 적용된다.
    pub fn setup(page: &dyn PageDocument) -> usize {
        let mut count = 0;
        for video in page.all_videos() {
            if video.controls_setup() {
                continue;
            }
            video.mark_controls_setup();
            video.set_controls(false);

            let hovering = Arc::new(AtomicBool::new(false));
            video.subscribe(Arc::new(move |element: &dyn MediaElement, event: MediaEvent| {
                match event {
                    MediaEvent::MouseEnter => {
                        if !hovering.swap(true, Ordering::AcqRel) {
                            element.set_controls(true);
                        }
                    }
                    MediaEvent::MouseLeave => {
                        if hovering.swap(false, Ordering::AcqRel) {
                            element.set_controls(false);
                        }
                    }
                    _ => {}
                }
            }));
            count += 1;
        }
        if count > 0 {
            debug!(videos = count, "호버 컨트롤 설정");
        }
        count
    }
}
