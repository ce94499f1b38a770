//! 쇼케이스 설정 구조체.
//!
//! 섹션별 재생 속도, 섹션 구조(선택자/그룹 형태/동기화 임계값), 변경 감시,
//! 모델 뷰어 시간 배율을 정의한다. 기본값은 페이지에 내장된 상수와 같다.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::error::CoreError;
use crate::models::layout::GroupShape;

/// 최상위 쇼케이스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// 섹션별 재생 속도
    #[serde(default)]
    pub speed: SpeedConfig,
    /// 섹션 목록
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
    /// DOM 변경 감시 설정
    #[serde(default)]
    pub observer: ObserverConfig,
    /// 모델 뷰어 설정
    #[serde(default)]
    pub viewer: ViewerConfig,
}

// ============================================================
// 재생 속도 설정
// ============================================================

/// 속도 적용 대상 (설정 키 → 컨테이너 선택자)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTarget {
    /// `rates` 맵의 키
    pub key: String,
    /// 컨테이너 선택자
    pub selector: String,
}

/// 섹션별 재생 속도 (1.0 = 정상, 0.5 = 절반 속도)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// 섹션 키 → 재생 속도
    #[serde(default = "default_rates")]
    pub rates: BTreeMap<String, f64>,
    /// 어느 섹션에도 속하지 않은 비디오의 속도
    #[serde(default = "default_rate")]
    pub default_rate: f64,
    /// 속도를 적용할 컨테이너 목록
    #[serde(default = "default_speed_targets")]
    pub targets: Vec<SpeedTarget>,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            default_rate: default_rate(),
            targets: default_speed_targets(),
        }
    }
}

impl SpeedConfig {
    /// 섹션 키의 속도 (없으면 `None`)
    pub fn rate_for(&self, key: &str) -> Option<f64> {
        self.rates.get(key).copied()
    }

    /// 감시 대상 컨테이너 선택자 목록
    pub fn selectors(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.selector.clone()).collect()
    }
}

// ============================================================
// 섹션 설정
// ============================================================

/// 그룹 동기화 임계값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 이산 이벤트(play/pause/seek/ratechange) 허용 오차 (초)
    #[serde(default = "default_discrete_threshold")]
    pub discrete_threshold_secs: f64,
    /// 진행 이벤트(timeupdate) 허용 오차 (초)
    #[serde(default = "default_short_clip_threshold")]
    pub progress_threshold_secs: f64,
    /// 진행 이벤트 쓰로틀 간격 (밀리초, `None`이면 쓰로틀 없음)
    #[serde(default = "default_progress_throttle_ms")]
    pub progress_throttle_ms: Option<u64>,
}

impl SyncConfig {
    /// 짧은/중간 길이 클립
    pub fn short_clip() -> Self {
        Self {
            discrete_threshold_secs: default_discrete_threshold(),
            progress_threshold_secs: default_short_clip_threshold(),
            progress_throttle_ms: default_progress_throttle_ms(),
        }
    }

    /// 긴 시퀀스 (허용 오차를 넓혀 떨림 감소)
    pub fn long_sequence() -> Self {
        Self {
            progress_threshold_secs: 0.3,
            ..Self::short_clip()
        }
    }

    /// 쓰로틀 없이 모든 이벤트를 이산 임계값으로 처리
    pub fn unthrottled() -> Self {
        Self {
            discrete_threshold_secs: default_discrete_threshold(),
            progress_threshold_secs: default_discrete_threshold(),
            progress_throttle_ms: None,
        }
    }
}

/// 세트 전환 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// 페이지 로드 시 표시할 세트
    #[serde(default = "default_initial_set")]
    pub initial_set: String,
    /// 리셋 표식 해제 지연 (밀리초)
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,
    /// 속도 설정에 섹션 키가 없을 때 쓰는 속도
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            initial_set: default_initial_set(),
            reset_delay_ms: default_reset_delay_ms(),
            fallback_rate: default_fallback_rate(),
        }
    }
}

/// 페이지 섹션 하나의 구조와 동작
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// 섹션 이름 (속도 설정 키 기본값)
    pub name: String,
    /// 컨테이너 선택자 (`None`이면 문서 전체)
    #[serde(default)]
    pub container: Option<String>,
    /// 세트 요소 선택자
    #[serde(default)]
    pub set_selector: Option<String>,
    /// 행 요소 선택자
    #[serde(default)]
    pub row_selector: Option<String>,
    /// 세트 버튼 선택자
    #[serde(default)]
    pub button_selector: Option<String>,
    /// 활성 상태 클래스
    #[serde(default = "default_active_class")]
    pub active_class: String,
    /// 행을 그룹으로 나누는 방식
    #[serde(default)]
    pub group_shape: GroupShape,
    /// 동기화 설정 (`None`이면 동기화 없음)
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    /// 세트 전환 설정 (`None`이면 전환 없음)
    #[serde(default)]
    pub switching: Option<SwitchConfig>,
    /// 마운트 시 모든 비디오를 음소거 자동재생
    #[serde(default)]
    pub autoplay_on_mount: bool,
    /// 재생 속도 설정 키 (없으면 `name`)
    #[serde(default)]
    pub speed_key: Option<String>,
}

impl SectionConfig {
    /// 재생 속도 설정 키
    pub fn speed_key(&self) -> &str {
        self.speed_key.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================
// 변경 감시 / 뷰어 설정
// ============================================================

/// DOM 변경 감시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// 마지막 변경 이후 재적용까지 대기 (밀리초)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// 컨테이너가 아직 없을 때 재시도 간격 (밀리초)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// 재시도 최대 횟수
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_limit: default_retry_limit(),
        }
    }
}

impl ObserverConfig {
    /// 디바운스 간격을 Duration으로 반환
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// 재시도 간격을 Duration으로 반환
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// 모델 뷰어 애니메이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// 목표 프레임 레이트
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// 원본 애니메이션 프레임 레이트
    #[serde(default = "default_original_fps")]
    pub original_fps: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            original_fps: default_original_fps(),
        }
    }
}

impl ViewerConfig {
    /// 애니메이션 시간 배율 (목표 / 원본)
    pub fn time_scale(&self) -> f64 {
        self.target_fps / self.original_fps
    }
}

// ============================================================
// ShowcaseConfig impl
// ============================================================

impl ShowcaseConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            speed: SpeedConfig::default(),
            sections: default_sections(),
            observer: ObserverConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }

    /// 이름으로 섹션 조회
    pub fn section(&self, name: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// 섹션 키에 해당하는 재생 속도 (세트 전환용 대체값 포함)
    pub fn section_rate(&self, section: &SectionConfig) -> f64 {
        let fallback = section
            .switching
            .as_ref()
            .map(|s| s.fallback_rate)
            .unwrap_or_else(default_fallback_rate);
        self.speed.rate_for(section.speed_key()).unwrap_or(fallback)
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        for (key, rate) in &self.speed.rates {
            if !(rate.is_finite() && *rate > 0.0) {
                return Err(invalid(&format!("speed.rates.{key}"), "재생 속도는 양수여야 합니다"));
            }
        }
        if !(self.speed.default_rate.is_finite() && self.speed.default_rate > 0.0) {
            return Err(invalid("speed.default_rate", "재생 속도는 양수여야 합니다"));
        }
        if self.viewer.original_fps <= 0.0 || self.viewer.target_fps <= 0.0 {
            return Err(invalid("viewer", "프레임 레이트는 양수여야 합니다"));
        }

        let mut names = HashSet::new();
        for section in &self.sections {
            if !names.insert(section.name.as_str()) {
                return Err(invalid("sections", &format!("중복된 섹션 이름: {}", section.name)));
            }
            if let Some(sync) = &section.sync {
                if sync.discrete_threshold_secs < 0.0 || sync.progress_threshold_secs < 0.0 {
                    return Err(invalid(
                        &format!("sections.{}.sync", section.name),
                        "임계값은 음수일 수 없습니다",
                    ));
                }
                if section.row_selector.is_none() {
                    return Err(invalid(
                        &format!("sections.{}.row_selector", section.name),
                        "동기화 섹션에는 행 선택자가 필요합니다",
                    ));
                }
            }
            if section.switching.is_some()
                && (section.set_selector.is_none() || section.button_selector.is_none())
            {
                return Err(invalid(
                    &format!("sections.{}.switching", section.name),
                    "세트 전환 섹션에는 세트/버튼 선택자가 필요합니다",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_rate() -> f64 {
    1.0
}
fn default_fallback_rate() -> f64 {
    0.5
}
fn default_discrete_threshold() -> f64 {
    0.05
}
fn default_short_clip_threshold() -> f64 {
    0.15
}
fn default_progress_throttle_ms() -> Option<u64> {
    Some(250)
}
fn default_initial_set() -> String {
    "1".to_string()
}
fn default_reset_delay_ms() -> u64 {
    100
}
fn default_active_class() -> String {
    "active".to_string()
}
fn default_debounce_ms() -> u64 {
    200
}
fn default_retry_delay_ms() -> u64 {
    100
}
fn default_retry_limit() -> u32 {
    50
}
fn default_target_fps() -> f64 {
    12.0
}
fn default_original_fps() -> f64 {
    30.0
}

fn default_rates() -> BTreeMap<String, f64> {
    [
        ("carousel", 0.7),
        ("platforms", 0.5),
        ("consistent4d", 0.5),
        ("davis", 0.5),
        ("img_to_4d", 0.5),
        ("txt_to_4d", 0.5),
        ("mesh_to_4d", 0.5),
        ("longseq", 0.8),
        ("retargetting", 0.5),
        ("limitations", 0.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_speed_targets() -> Vec<SpeedTarget> {
    [
        ("carousel", ".video-carousel-container"),
        ("platforms", ".application-platforms"),
        ("consistent4d", ".video-table"),
        ("davis", "#io-grid"),
        ("img_to_4d", "#img-to-4d-grid"),
        ("txt_to_4d", "#txt-to-4d-grid"),
        ("mesh_to_4d", "#mesh-to-4d-grid"),
        ("longseq", "#longseq-grid"),
        ("retargetting", "#retargetting-grid"),
        ("limitations", ".limitations-video-table"),
    ]
    .into_iter()
    .map(|(key, selector)| SpeedTarget {
        key: key.to_string(),
        selector: selector.to_string(),
    })
    .collect()
}

fn switching_section(name: &str, container: Option<&str>, prefix: &str, active_class: &str) -> SectionConfig {
    SectionConfig {
        name: name.to_string(),
        container: container.map(String::from),
        set_selector: Some(format!(".{prefix}video-set")),
        row_selector: None,
        button_selector: Some(format!(".{prefix}set-button")),
        active_class: active_class.to_string(),
        group_shape: GroupShape::Row,
        sync: None,
        switching: Some(SwitchConfig::default()),
        autoplay_on_mount: false,
        speed_key: None,
    }
}

fn default_sections() -> Vec<SectionConfig> {
    let consistent4d = SectionConfig {
        row_selector: Some(".video-row".to_string()),
        sync: Some(SyncConfig::short_clip()),
        ..switching_section("consistent4d", None, "", "active")
    };

    let davis = SectionConfig {
        row_selector: Some(".io-video-row".to_string()),
        group_shape: GroupShape::Pair,
        sync: Some(SyncConfig::short_clip()),
        ..switching_section("davis", Some("#io-grid"), "io-", "io-active")
    };

    let img_to_4d = switching_section(
        "img_to_4d",
        Some("#img-to-4d-grid"),
        "img-to-4d-",
        "img-to-4d-active",
    );

    let mesh_to_4d = switching_section("mesh_to_4d", None, "mesh-to-4d-", "mesh-to-4d-active");

    let longseq = SectionConfig {
        name: "longseq".to_string(),
        container: Some("#longseq-grid".to_string()),
        set_selector: None,
        row_selector: Some(".longseq-video-row".to_string()),
        button_selector: None,
        active_class: default_active_class(),
        group_shape: GroupShape::Pair,
        sync: Some(SyncConfig::long_sequence()),
        switching: None,
        autoplay_on_mount: false,
        speed_key: None,
    };

    let retargetting = SectionConfig {
        name: "retargetting".to_string(),
        container: Some("#retargetting-grid".to_string()),
        row_selector: Some(".retargetting-video-row".to_string()),
        group_shape: GroupShape::Row,
        sync: Some(SyncConfig::unthrottled()),
        autoplay_on_mount: true,
        ..longseq.clone()
    };

    let limitations = SectionConfig {
        name: "limitations".to_string(),
        container: Some(".limitations-video-table".to_string()),
        row_selector: Some(".limitations-video-row".to_string()),
        group_shape: GroupShape::Pair,
        sync: Some(SyncConfig::unthrottled()),
        ..longseq.clone()
    };

    vec![
        consistent4d,
        davis,
        img_to_4d,
        mesh_to_4d,
        longseq,
        retargetting,
        limitations,
    ]
}
