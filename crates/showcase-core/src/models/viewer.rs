//! 3D 모델 뷰어 관련 모델.

use serde::{Deserialize, Serialize};

/// 모델 뷰어가 발생시키는 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerEvent {
    /// 모델 로드 완료
    Load,
    /// 씬 그래프 준비 완료 (애니메이션 접근 가능)
    SceneGraphReady,
}

/// 재생/일시정지 버튼 라벨
pub const PAUSE_LABEL: &str = "⏸ Pause";
/// 재생/일시정지 버튼 라벨 (정지 상태)
pub const PLAY_LABEL: &str = "▶ Play";

/// 재생 상태에 맞는 버튼 라벨
pub fn play_pause_label(playing: bool) -> &'static str {
    if playing {
        PAUSE_LABEL
    } else {
        PLAY_LABEL
    }
}
