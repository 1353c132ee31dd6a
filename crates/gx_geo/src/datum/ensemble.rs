// geodex\crates\gx_geo\src\datum\ensemble.rs
//! 基准集合（DatumEnsemble）

use super::Datum;
use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::metadata::{names_equivalent, ObjectMeta, PositionalAccuracy};
use std::sync::Arc;

/// 基准集合：至少两个同类成员及其精度上限
#[derive(Debug, Clone, PartialEq)]
pub struct DatumEnsemble {
    /// 元数据
    pub meta: ObjectMeta,
    members: Vec<Arc<Datum>>,
    accuracy: PositionalAccuracy,
}

impl DatumEnsemble {
    /// 创建基准集合
    ///
    /// 成员少于两个或类别不一致时返回 `InvalidConstruction`。
    pub fn create(
        meta: ObjectMeta,
        members: Vec<Arc<Datum>>,
        accuracy_m: f64,
    ) -> GeoResult<Self> {
        GeoError::check_construction(members.len() >= 2, "基准集合", || {
            format!("至少需要两个成员，实际 {}", members.len())
        })?;
        let first = &members[0];
        GeoError::check_construction(
            members.iter().all(|m| m.same_kind(first)),
            "基准集合",
            || "成员基准类别不一致".to_string(),
        )?;
        let accuracy = PositionalAccuracy::new(accuracy_m)?;
        Ok(Self {
            meta,
            members,
            accuracy,
        })
    }

    /// 成员列表
    pub fn members(&self) -> &[Arc<Datum>] {
        &self.members
    }

    /// 集合精度
    pub fn accuracy(&self) -> PositionalAccuracy {
        self.accuracy
    }

    /// 代表性基准：集合名称 + 第一个成员的内容
    pub fn as_datum(&self) -> Arc<Datum> {
        let first = &self.members[0];
        let mut datum = (**first).clone();
        datum.meta = self.meta.clone();
        Arc::new(datum)
    }

    /// 是否包含与给定基准等价的成员
    pub fn contains(&self, datum: &Datum, criterion: Criterion) -> bool {
        self.members
            .iter()
            .any(|m| m.is_equivalent_to(datum, criterion))
    }
}

impl Equivalence for DatumEnsemble {
    fn is_equivalent_to(&self, other: &Self, criterion: Criterion) -> bool {
        if criterion.is_strict() && !names_equivalent(&self.meta.name, &other.meta.name) {
            return false;
        }
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.is_equivalent_to(b, criterion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::{Ellipsoid, PrimeMeridian};

    fn frame(name: &str) -> Arc<Datum> {
        Arc::new(Datum::geodetic(
            ObjectMeta::named(name),
            Ellipsoid::WGS84,
            PrimeMeridian::GREENWICH,
        ))
    }

    #[test]
    fn test_too_few_members() {
        let err = DatumEnsemble::create(ObjectMeta::named("e"), vec![frame("a")], 2.0).unwrap_err();
        match &err {
            GeoError::InvalidConstruction { what, .. } => assert_eq!(*what, "基准集合"),
            _ => panic!("错误的错误类型"),
        }
    }

    #[test]
    fn test_mixed_kinds() {
        let v = Arc::new(Datum::vertical(ObjectMeta::named("v")));
        assert!(DatumEnsemble::create(ObjectMeta::named("e"), vec![frame("a"), v], 2.0).is_err());
    }

    #[test]
    fn test_as_datum() {
        let e = DatumEnsemble::create(
            ObjectMeta::named("World Geodetic System 1984 ensemble"),
            vec![frame("WGS 84 (G730)"), frame("WGS 84 (G873)")],
            2.0,
        )
        .unwrap();
        let d = e.as_datum();
        assert_eq!(d.name(), "World Geodetic System 1984 ensemble");
        assert_eq!(d.ellipsoid(), Some(&Ellipsoid::WGS84));
        assert!(e.contains(&frame("WGS 84 (G873)"), Criterion::Equivalent));
        assert_eq!(e.accuracy().metres(), 2.0);
    }
}
