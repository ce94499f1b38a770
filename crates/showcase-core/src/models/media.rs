//! 미디어 요소 관련 모델.
//!
//! 준비 상태, 프리로드 정책, 네이티브 이벤트 종류, 동기화 트리거.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 미디어 준비 상태 (0 = 데이터 없음 ~ 4 = 충분히 버퍼링됨)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// 서수 값
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// 아직 아무 데이터도 로드되지 않았는지
    pub fn is_unloaded(self) -> bool {
        self == ReadyState::HaveNothing
    }
}

/// 프리로드 정책. `None`은 "아직 한 번도 로드하지 않음" 표식으로 쓰인다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preload {
    #[default]
    None,
    Metadata,
    Auto,
}

/// 미디어 요소가 발생시키는 네이티브 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEvent {
    Play,
    Pause,
    Seeking,
    Seeked,
    RateChange,
    TimeUpdate,
    LoadedMetadata,
    MouseEnter,
    MouseLeave,
}

impl MediaEvent {
    /// DOM 이벤트 이름
    pub fn as_str(self) -> &'static str {
        match self {
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
            MediaEvent::RateChange => "ratechange",
            MediaEvent::TimeUpdate => "timeupdate",
            MediaEvent::LoadedMetadata => "loadedmetadata",
            MediaEvent::MouseEnter => "mouseenter",
            MediaEvent::MouseLeave => "mouseleave",
        }
    }
}

impl fmt::Display for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 동기화 패스를 유발하는 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTrigger {
    /// 재생 진행 (timeupdate): 쓰로틀 대상
    Progress,
    Play,
    Pause,
    Seeking,
    Seeked,
    RateChange,
}

impl SyncTrigger {
    /// 네이티브 이벤트를 동기화 트리거로 변환 (무관한 이벤트는 `None`)
    pub fn from_event(event: MediaEvent) -> Option<Self> {
        match event {
            MediaEvent::TimeUpdate => Some(SyncTrigger::Progress),
            MediaEvent::Play => Some(SyncTrigger::Play),
            MediaEvent::Pause => Some(SyncTrigger::Pause),
            MediaEvent::Seeking => Some(SyncTrigger::Seeking),
            MediaEvent::Seeked => Some(SyncTrigger::Seeked),
            MediaEvent::RateChange => Some(SyncTrigger::RateChange),
            MediaEvent::LoadedMetadata | MediaEvent::MouseEnter | MediaEvent::MouseLeave => None,
        }
    }

    /// 고빈도 진행 이벤트인지
    pub fn is_progress(self) -> bool {
        self == SyncTrigger::Progress
    }
}

/// 미디어 요소 상태 스냅샷 (리포트/테스트용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub id: String,
    pub current_time: f64,
    pub paused: bool,
    pub playback_rate: f64,
    pub ready_state: ReadyState,
    pub preload: Preload,
    pub resetting: bool,
}
