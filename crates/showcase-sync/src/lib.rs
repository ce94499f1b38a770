//! # showcase-sync
//!
//! 비디오 그룹 동기화 엔진과 세트 전환기.
//!
//! - [`synchronizer`] — 한 그룹(행/쌍)의 재생 시간·상태·속도를 이벤트 발생 요소에 맞춤
//! - [`switcher`] — 섹션 안의 세트를 하나만 활성화하고 나머지를 정지/되감기
//! - [`activity`] — 세트 활성 상태 공유 핸들

pub mod activity;
pub mod switcher;
pub mod synchronizer;

pub use activity::SetActivity;
pub use switcher::{SetSwitcher, SwitchPolicy, VideoSet};
pub use synchronizer::{SyncPolicy, SyncStats, VideoGroupSynchronizer};
