// geodex\crates\gx_geo\src\factory\derived.rs
//! 派生与投影 CRS
//!
//! 派生 CRS 拆成定义转换和基础 CRS 之间的操作。两端基础 CRS 等价时
//! 直接用 逆定义转换 + 定义转换。

use super::{concatenate, CoordinateOperationFactory, Operations};
use crate::context::OperationContext;
use crate::crs::Crs;
use crate::equivalence::{Criterion, Equivalence};
use std::sync::Arc;

pub(super) fn search(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    match (source.as_derived(), target.as_derived()) {
        (Some(s), Some(t)) if s.base().is_equivalent_to(t.base(), Criterion::Equivalent) => {
            log::trace!("'{}' 与 '{}' 基础 CRS 相同", source.name(), target.name());
            let steps = source
                .deriving_conversion()
                .zip(target.deriving_conversion())
                .map(|(from, to)| vec![from.inverse(), to]);
            steps.and_then(concatenate).into_iter().collect()
        }
        (Some(_), _) => from_derived(factory, source, target, ctx),
        (None, Some(_)) => to_derived(factory, source, target, ctx),
        (None, None) => Vec::new(),
    }
}

/// 源为派生 CRS：逆定义转换接上基础 CRS 到目标的操作
fn from_derived(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let (Some(conversion), Some(base)) = (source.deriving_conversion(), source.base_crs()) else {
        return Vec::new();
    };
    let inverse = conversion.inverse();
    if base.is_equivalent_to(target, Criterion::Equivalent) {
        return vec![inverse];
    }
    factory
        .search(base, target, ctx)
        .into_iter()
        .filter_map(|op| concatenate(vec![inverse.clone(), op]))
        .collect()
}

/// 目标为派生 CRS：源到基础 CRS 的操作接上定义转换
fn to_derived(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let (Some(conversion), Some(base)) = (target.deriving_conversion(), target.base_crs()) else {
        return Vec::new();
    };
    if base.is_equivalent_to(source, Criterion::Equivalent) {
        return vec![conversion];
    }
    factory
        .search(source, base, ctx)
        .into_iter()
        .filter_map(|op| concatenate(vec![op, conversion.clone()]))
        .collect()
}
