//! 세트 활성 상태 핸들.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 세트가 소유하고 그 세트의 그룹 동기화기가 읽는 활성 플래그.
///
/// 복제본은 같은 플래그를 가리킨다.
#[derive(Debug, Clone, Default)]
pub struct SetActivity(Arc<AtomicBool>);

impl SetActivity {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set_active(&self, active: bool) {
        self.0.store(active, Ordering::Release);
    }
}
