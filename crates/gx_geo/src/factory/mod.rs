// geodex\crates\gx_geo\src\factory\mod.rs
//! 坐标操作工厂
//!
//! 给定源、目标 CRS 和 [`OperationContext`]，枚举、组合、过滤、排序并去重
//! 候选坐标操作。
//!
//! # 分派顺序
//!
//! 1. 等价 CRS：空操作
//! 2. 绑定 CRS（[`bound`]）
//! 3. 复合 CRS（[`compound`]）
//! 4. 派生/投影 CRS：拆成定义转换与基础 CRS 间的操作（[`derived`]）
//! 5. 垂直 CRS（[`vertical`]）
//! 6. 大地族 CRS（[`geodetic`]）
//!
//! 内部搜索返回未排序的候选；只有最外层调用经过 [`ranking`]。
//!
//! # 示例
//!
//! ```
//! use gx_geo::crs::wellknown;
//! use gx_geo::context::OperationContext;
//! use gx_geo::factory::CoordinateOperationFactory;
//!
//! let factory = CoordinateOperationFactory::new();
//! let op = factory
//!     .create_operation(&wellknown::epsg_4326(), &wellknown::epsg_4326(), &OperationContext::new())
//!     .unwrap();
//! assert_eq!(op.to_pipeline_string().unwrap(), "+proj=noop");
//! ```

mod bound;
mod compound;
mod derived;
mod geodetic;
mod lookup;
mod ranking;
mod vertical;

use crate::context::OperationContext;
use crate::crs::Crs;
use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::operation::CoordinateOperation;
use std::sync::Arc;

/// 操作列表
pub(crate) type Operations = Vec<Arc<CoordinateOperation>>;

/// 坐标操作工厂（无状态）
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateOperationFactory;

impl CoordinateOperationFactory {
    /// 创建工厂
    pub fn new() -> Self {
        Self
    }

    /// 按上下文排序后的全部候选操作
    ///
    /// 只有类别互不兼容（例如时间 CRS 与地理 CRS）时返回空列表。
    pub fn create_operations(
        &self,
        source: &Arc<Crs>,
        target: &Arc<Crs>,
        ctx: &OperationContext,
    ) -> Vec<Arc<CoordinateOperation>> {
        log::debug!("搜索操作: '{}' -> '{}'", source.name(), target.name());
        let candidates = self.search(source, target, ctx);
        log::debug!("共 {} 个候选", candidates.len());
        ranking::rank(candidates, source, target, ctx)
    }

    /// 最优操作；没有任何候选时返回 [`GeoError::NoOperationFound`]
    pub fn create_operation(
        &self,
        source: &Arc<Crs>,
        target: &Arc<Crs>,
        ctx: &OperationContext,
    ) -> GeoResult<Arc<CoordinateOperation>> {
        self.create_operations(source, target, ctx)
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::no_operation_found(source.name(), target.name()))
    }

    /// 未排序的候选
    pub(crate) fn search(
        &self,
        source: &Arc<Crs>,
        target: &Arc<Crs>,
        ctx: &OperationContext,
    ) -> Operations {
        if source.is_equivalent_to(target, Criterion::Equivalent) {
            log::trace!("'{}' 与 '{}' 等价，返回空操作", source.name(), target.name());
            return vec![CoordinateOperation::create_null(source.clone(), target.clone())];
        }
        if source.is_bound() || target.is_bound() {
            return bound::search(self, source, target, ctx);
        }
        if source.is_compound() || target.is_compound() {
            return compound::search(self, source, target, ctx);
        }
        if source.is_derived() || target.is_derived() {
            return derived::search(self, source, target, ctx);
        }
        if source.is_vertical() || target.is_vertical() {
            return vertical::search(self, source, target, ctx);
        }
        if source.is_geodetic_family() && target.is_geodetic_family() {
            return geodetic::search(source, target, ctx);
        }
        log::debug!(
            "'{}' 与 '{}' 的类别之间没有可用操作",
            source.name(),
            target.name()
        );
        Vec::new()
    }
}

/// 反转一组操作
pub(crate) fn invert_all(ops: Operations) -> Operations {
    ops.iter().map(|op| op.inverse()).collect()
}

/// 串联；串联失败记录为警告并丢弃
pub(crate) fn concatenate(steps: Vec<Arc<CoordinateOperation>>) -> Option<Arc<CoordinateOperation>> {
    match CoordinateOperation::create_compute_metadata(steps) {
        Ok(op) => Some(op),
        Err(err) => {
            log::warn!("丢弃无法串联的候选: {err}");
            None
        }
    }
}

/// 串联已提升到复合 CRS 上的分量操作；失败记录为警告并丢弃
pub(crate) fn concatenate_lifted(
    steps: Vec<Arc<CoordinateOperation>>,
) -> Option<Arc<CoordinateOperation>> {
    match CoordinateOperation::create_lifted_concatenation(steps) {
        Ok(op) => Some(op),
        Err(err) => {
            log::warn!("丢弃无法串联的提升候选: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::cs::CoordinateSystem;
    use crate::datum::{Datum, DatumKind};
    use crate::metadata::ObjectMeta;
    use crate::units::{Measure, UnitOfMeasure};

    fn pipeline(source: &Arc<Crs>, target: &Arc<Crs>) -> String {
        CoordinateOperationFactory::new()
            .create_operation(source, target, &OperationContext::new())
            .unwrap()
            .to_pipeline_string()
            .unwrap()
    }

    #[test]
    fn test_identity_is_noop() {
        assert_eq!(pipeline(&wellknown::epsg_4326(), &wellknown::epsg_4326()), "+proj=noop");
        let op = CoordinateOperationFactory::new()
            .create_operation(&wellknown::epsg_4326(), &wellknown::epsg_4326(), &OperationContext::new())
            .unwrap();
        assert_eq!(op.name(), "Null geographic offset from WGS 84 to WGS 84");
        assert_eq!(op.accuracy(), Some(0.0));
    }

    #[test]
    fn test_incompatible_kinds() {
        let time = Crs::temporal(
            ObjectMeta::named("Calendar"),
            Datum::temporal(ObjectMeta::named("Epoch"), "1970-01-01"),
            CoordinateSystem::temporal(UnitOfMeasure::YEAR),
        )
        .unwrap();
        assert!(matches!(
            time.datum().unwrap().kind(),
            DatumKind::Temporal { .. }
        ));
        let factory = CoordinateOperationFactory::new();
        let ctx = OperationContext::new();
        assert!(factory
            .create_operations(&time, &wellknown::epsg_4326(), &ctx)
            .is_empty());
        let err = factory
            .create_operation(&time, &wellknown::epsg_4326(), &ctx)
            .unwrap_err();
        match &err {
            GeoError::NoOperationFound { source_name, .. } => assert_eq!(source_name, "Calendar"),
            _ => panic!("错误的错误类型"),
        }
    }

    #[test]
    fn test_concatenate_discards_broken_chain() {
        let a = CoordinateOperation::create_ballpark_geographic_offset(
            wellknown::epsg_4326(),
            wellknown::epsg_4807(),
        );
        let b = CoordinateOperation::create_longitude_rotation(
            ObjectMeta::named("rotation"),
            wellknown::epsg_4326(),
            wellknown::epsg_4326(),
            Measure::degrees(1.0),
        );
        assert!(concatenate(vec![a.clone(), b]).is_none());
        assert!(concatenate(vec![a.clone(), a.inverse()]).is_none());
    }
}
