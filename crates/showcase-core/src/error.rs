//! 쇼케이스 핵심 에러 타입.
//!
//! 호스트 어댑터와 상위 crate는 `CoreError`를 그대로 전파한다.
//! 미디어 조작 실패(`MediaError`)는 호출부에서 무시되는 것이 정상 경로다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 유효성 검증 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 ({field}): {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Container", "Viewer")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 미디어 요소 조작 실패
    #[error(transparent)]
    Media(#[from] MediaError),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 미디어 요소 조작 에러.
///
/// 둘 다 프레젠테이션 레이어에서는 치명적이지 않다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    /// 탐색 가능 범위를 벗어난 시각 지정
    #[error("탐색 범위 초과: 요청 {requested:.3}s, 길이 {duration:.3}s")]
    SeekOutOfRange {
        /// 요청한 시각 (초)
        requested: f64,
        /// 미디어 길이 (초)
        duration: f64,
    },

    /// 자동재생 정책 등으로 재생 요청 거부
    #[error("재생 요청 거부: {0}")]
    PlayRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_error_wraps_into_core_error() {
        let err: CoreError = MediaError::PlayRejected("autoplay".to_string()).into();
        assert!(matches!(err, CoreError::Media(MediaError::PlayRejected(_))));
        assert_eq!(err.to_string(), "재생 요청 거부: autoplay");
    }

    #[test]
    fn seek_error_message_has_both_times() {
        let err = MediaError::SeekOutOfRange {
            requested: 12.5,
            duration: 10.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("12.500"));
        assert!(msg.contains("10.000"));
    }
}
