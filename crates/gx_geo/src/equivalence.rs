// geodex\crates\gx_geo\src\equivalence.rs
//! 对象等价判定

use serde::{Deserialize, Serialize};

/// 等价判定准则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    /// 严格：名称与标识也必须一致
    Strict,
    /// 结构等价：忽略名称差异
    Equivalent,
    /// 结构等价，且地理 CRS 的经纬度轴序可以不同
    EquivalentIgnoringAxisOrderForGeographic,
}

impl Criterion {
    /// 是否严格
    #[inline]
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// 下钻到子对象时使用的准则（轴序放宽只作用于最外层地理 CRS）
    #[inline]
    pub fn for_components(self) -> Self {
        match self {
            Self::EquivalentIgnoringAxisOrderForGeographic => Self::Equivalent,
            other => other,
        }
    }
}

/// 可按准则比较的对象
pub trait Equivalence {
    /// 按给定准则判定是否等价
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool;
}
