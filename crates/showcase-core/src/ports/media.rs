//! 미디어 요소 포트.
//!
//! 구현: 브라우저 바인딩 또는 `showcase-runtime::sim::SimulatedVideo`.
//! 요소의 생성/소멸은 호스트(페이지)가 소유하며, 이 crate들은 상태만 변경한다.

use std::sync::Arc;

use tracing::trace;

use crate::error::MediaError;
use crate::models::media::{MediaEvent, PlaybackSnapshot, Preload, ReadyState};

/// 공유 미디어 요소 참조
pub type MediaRef = Arc<dyn MediaElement>;

/// 네이티브 이벤트 리스너. 이벤트를 발생시킨 요소 자신이 함께 전달된다.
pub type MediaListener = Arc<dyn Fn(&dyn MediaElement, MediaEvent) + Send + Sync>;

/// `loadedmetadata` 1회성 콜백
pub type MetadataCallback = Box<dyn FnOnce() + Send>;

/// 비디오 요소 인터페이스
///
/// 호스트는 상태 변경에 대한 이벤트(`seeking`/`seeked`, `play`/`pause`,
/// `ratechange`)를 변경 호출 안에서 동기적으로 발생시킬 수 있다.
/// 구현체는 리스너 호출 중에 내부 락을 잡고 있으면 안 된다.
pub trait MediaElement: Send + Sync {
    /// 요소 식별자 (페이지 내 유일)
    fn id(&self) -> &str;

    /// 현재 재생 위치 (초)
    fn current_time(&self) -> f64;

    /// 재생 위치 변경. 탐색 가능 범위 밖이면 에러, 위치는 유지된다.
    fn seek(&self, time: f64) -> Result<(), MediaError>;

    /// 일시정지 상태인지
    fn is_paused(&self) -> bool;

    /// 재생 요청. 정책에 의해 거부되면 에러, 요소는 정지 상태로 남는다.
    fn play(&self) -> Result<(), MediaError>;

    /// 일시정지
    fn pause(&self);

    /// 재생 속도
    fn playback_rate(&self) -> f64;

    /// 재생 속도 변경
    fn set_playback_rate(&self, rate: f64);

    /// 준비 상태
    fn ready_state(&self) -> ReadyState;

    /// 프리로드 정책
    fn preload(&self) -> Preload;

    /// 프리로드 정책 변경
    fn set_preload(&self, preload: Preload);

    /// 음소거 설정
    fn set_muted(&self, muted: bool);

    /// 리소스 로드 시작
    fn load(&self);

    /// 세트 전환 중 리셋 표식
    fn is_resetting(&self) -> bool;

    /// 리셋 표식 변경
    fn set_resetting(&self, resetting: bool);

    /// 다음 `loadedmetadata`에 한 번만 호출될 콜백 등록
    fn once_loaded_metadata(&self, callback: MetadataCallback);

    /// 네이티브 컨트롤(스크러버) 표시 여부
    fn set_controls(&self, visible: bool);

    /// 호버 컨트롤 설정이 이미 끝났는지
    fn controls_setup(&self) -> bool;

    /// 호버 컨트롤 설정 완료 표식
    fn mark_controls_setup(&self);

    /// 이벤트 리스너 등록
    fn subscribe(&self, listener: MediaListener);

    /// 현재 상태 스냅샷
    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            id: self.id().to_string(),
            current_time: self.current_time(),
            paused: self.is_paused(),
            playback_rate: self.playback_rate(),
            ready_state: self.ready_state(),
            preload: self.preload(),
            resetting: self.is_resetting(),
        }
    }
}

/// 실패를 무시하는 fire-and-forget 조작.
///
/// 범위 밖 탐색과 거부된 재생은 정상 경로로 취급한다. 호출자는 결과로 분기하지 않는다.
pub trait MediaElementExt {
    /// 재생 요청 (거부 무시)
    fn request_play(&self);

    /// 재생 위치 변경 요청 (범위 초과 무시)
    fn request_seek(&self, time: f64);
}

impl<T: MediaElement + ?Sized> MediaElementExt for T {
    fn request_play(&self) {
        if let Err(e) = self.play() {
            trace!(id = self.id(), "재생 요청 무시: {}", e);
        }
    }

    fn request_seek(&self, time: f64) {
        if let Err(e) = self.seek(time) {
            trace!(id = self.id(), "탐색 요청 무시: {}", e);
        }
    }
}
