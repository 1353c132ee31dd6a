// geodex\crates\gx_geo\src\datum\frames.rs
//! 参考框架（基准）
//!
//! [`Datum`] 是封闭枚举式的基准模型：大地、垂直、时间、工程、参数基准。
//! 大地基准持有椭球和本初子午线。

use super::{Ellipsoid, PrimeMeridian};
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::{names_equivalent, ObjectMeta};

/// 基准类别及其专有数据
#[derive(Debug, Clone, PartialEq)]
pub enum DatumKind {
    /// 大地参考框架
    Geodetic {
        /// 椭球
        ellipsoid: Ellipsoid,
        /// 本初子午线
        prime_meridian: PrimeMeridian,
    },
    /// 垂直参考框架
    Vertical,
    /// 时间基准
    Temporal {
        /// 时间原点（ISO 8601 文本）
        origin: String,
    },
    /// 工程基准
    Engineering,
    /// 参数基准
    Parametric,
}

/// 基准
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    /// 元数据
    pub meta: ObjectMeta,
    /// 锚定描述
    pub anchor: Option<String>,
    kind: DatumKind,
}

impl Datum {
    /// 大地参考框架
    pub fn geodetic(meta: ObjectMeta, ellipsoid: Ellipsoid, prime_meridian: PrimeMeridian) -> Self {
        Self {
            meta,
            anchor: None,
            kind: DatumKind::Geodetic {
                ellipsoid,
                prime_meridian,
            },
        }
    }

    /// 垂直参考框架
    pub fn vertical(meta: ObjectMeta) -> Self {
        Self {
            meta,
            anchor: None,
            kind: DatumKind::Vertical,
        }
    }

    /// 时间基准
    pub fn temporal(meta: ObjectMeta, origin: impl Into<String>) -> Self {
        Self {
            meta,
            anchor: None,
            kind: DatumKind::Temporal {
                origin: origin.into(),
            },
        }
    }

    /// 工程基准
    pub fn engineering(meta: ObjectMeta) -> Self {
        Self {
            meta,
            anchor: None,
            kind: DatumKind::Engineering,
        }
    }

    /// 参数基准
    pub fn parametric(meta: ObjectMeta) -> Self {
        Self {
            meta,
            anchor: None,
            kind: DatumKind::Parametric,
        }
    }

    /// 设置锚定描述
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// 类别
    pub fn kind(&self) -> &DatumKind {
        &self.kind
    }

    /// 是否为大地基准
    pub fn is_geodetic(&self) -> bool {
        matches!(self.kind, DatumKind::Geodetic { .. })
    }

    /// 是否为垂直基准
    pub fn is_vertical(&self) -> bool {
        matches!(self.kind, DatumKind::Vertical)
    }

    /// 类别相同（不比较内容）
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
    }

    /// 椭球（仅大地基准）
    pub fn ellipsoid(&self) -> Option<&Ellipsoid> {
        match &self.kind {
            DatumKind::Geodetic { ellipsoid, .. } => Some(ellipsoid),
            _ => None,
        }
    }

    /// 本初子午线（仅大地基准）
    pub fn prime_meridian(&self) -> Option<&PrimeMeridian> {
        match &self.kind {
            DatumKind::Geodetic { prime_meridian, .. } => Some(prime_meridian),
            _ => None,
        }
    }

    /// 替换本初子午线，其余保持不变
    pub fn with_prime_meridian(&self, meta: ObjectMeta, pm: PrimeMeridian) -> Self {
        let kind = match &self.kind {
            DatumKind::Geodetic { ellipsoid, .. } => DatumKind::Geodetic {
                ellipsoid: ellipsoid.clone(),
                prime_meridian: pm,
            },
            other => other.clone(),
        };
        Self {
            meta,
            anchor: self.anchor.clone(),
            kind,
        }
    }

    /// 除本初子午线外相同（名称、椭球）
    pub fn differs_only_by_prime_meridian(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (
                DatumKind::Geodetic {
                    ellipsoid: e1,
                    prime_meridian: p1,
                },
                DatumKind::Geodetic {
                    ellipsoid: e2,
                    prime_meridian: p2,
                },
            ) => {
                same_identity(&self.meta, &other.meta, Criterion::Equivalent)
                    && e1.is_equivalent_to(e2, Criterion::Equivalent)
                    && !p1.is_equivalent_to(p2, Criterion::Equivalent)
            }
            _ => false,
        }
    }
}

/// 基准身份：严格时比较名称和标识，否则名称归一化后相同、共享标识或一方无名
fn same_identity(a: &ObjectMeta, b: &ObjectMeta, criterion: Criterion) -> bool {
    if criterion.is_strict() {
        let ids_ok = a.identifiers.is_empty()
            || b.identifiers.is_empty()
            || a.shares_identifier(b);
        return ids_ok && names_equivalent(&a.name, &b.name);
    }
    a.has_unknown_name()
        || b.has_unknown_name()
        || a.shares_identifier(b)
        || names_equivalent(&a.name, &b.name)
        || a.aliases.iter().any(|alias| names_equivalent(alias, &b.name))
        || b.aliases.iter().any(|alias| names_equivalent(alias, &a.name))
}

impl Equivalence for Datum {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        if !same_identity(&self.meta, &other.meta, criterion) {
            return false;
        }
        match (&self.kind, &other.kind) {
            (
                DatumKind::Geodetic {
                    ellipsoid: e1,
                    prime_meridian: p1,
                },
                DatumKind::Geodetic {
                    ellipsoid: e2,
                    prime_meridian: p2,
                },
            ) => e1.is_equivalent_to(e2, criterion) && p1.is_equivalent_to(p2, criterion),
            (DatumKind::Temporal { origin: o1 }, DatumKind::Temporal { origin: o2 }) => o1 == o2,
            (DatumKind::Vertical, DatumKind::Vertical)
            | (DatumKind::Engineering, DatumKind::Engineering)
            | (DatumKind::Parametric, DatumKind::Parametric) => true,
            _ => false,
        }
    }
}
