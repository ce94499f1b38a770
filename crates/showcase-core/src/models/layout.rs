//! 동기화 그룹 형태.

use serde::{Deserialize, Serialize};

/// 한 행의 비디오를 동기화 그룹으로 나누는 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupShape {
    /// 행 전체가 하나의 그룹
    #[default]
    Row,
    /// 앞에서부터 두 개씩 짝지음 (예: [입력, 출력])
    Pair,
}

impl GroupShape {
    /// 행을 그룹 목록으로 분할.
    ///
    /// `Pair`는 짝이 없는 마지막 요소를 버린다. 빈 행은 그룹을 만들지 않는다.
    pub fn partition<T: Clone>(self, row: &[T]) -> Vec<Vec<T>> {
        match self {
            GroupShape::Row if row.is_empty() => Vec::new(),
            GroupShape::Row => vec![row.to_vec()],
            GroupShape::Pair => row.chunks_exact(2).map(|pair| pair.to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_keeps_whole_row() {
        let groups = GroupShape::Row.partition(&["a", "b", "c"]);
        assert_eq!(groups, vec![vec!["a", "b", "c"]]);
        assert!(GroupShape::Row.partition::<&str>(&[]).is_empty());
    }

    #[test]
    fn pair_drops_trailing_odd_member() {
        let groups = GroupShape::Pair.partition(&[1, 2, 3, 4, 5]);
        assert_eq!(groups, vec![vec![1, 2], vec![3, 4]]);
    }
}
