// geodex\crates\gx_geo\src\operation\concatenated.rs
//! 串联操作
//!
//! 相邻步骤必须首尾相接：前一步目标与后一步源标识相同或等价，
//! 或复合 CRS 的垂直分量与另一端相接。

use super::{CoordinateOperation, CrsLink, OperationKind};
use crate::crs::Crs;
use crate::equivalence::{Criterion, Equivalence};
use crate::error::{GeoError, GeoResult};
use crate::metadata::{GeographicBoundingBox, ObjectMeta, PositionalAccuracy};
use std::sync::Arc;

/// 不做校验地组装串联操作
pub(super) fn assemble(
    meta: ObjectMeta,
    steps: Vec<Arc<CoordinateOperation>>,
    accuracies: Vec<PositionalAccuracy>,
    has_ballpark: bool,
) -> CoordinateOperation {
    let source = steps.first().and_then(|s| s.source_crs()).map(CrsLink::Strong);
    let target = steps.last().and_then(|s| s.target_crs()).map(CrsLink::Strong);
    CoordinateOperation {
        meta,
        source,
        target,
        interpolation_crs: None,
        accuracies,
        has_ballpark,
        kind: OperationKind::Concatenated(steps),
    }
}

fn same_single_identifier(a: &Crs, b: &Crs) -> bool {
    match (a.meta.single_identifier(), b.meta.single_identifier()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// 两个 CRS 是否首尾相接
pub(crate) fn chains(previous_target: &Arc<Crs>, next_source: &Arc<Crs>) -> bool {
    if Arc::ptr_eq(previous_target, next_source)
        || same_single_identifier(previous_target, next_source)
        || previous_target.is_equivalent_to(next_source, Criterion::Equivalent)
    {
        return true;
    }
    if let Some(b) = previous_target.as_bound() {
        if chains(b.base(), next_source) {
            return true;
        }
    }
    if let Some(b) = next_source.as_bound() {
        if chains(previous_target, b.base()) {
            return true;
        }
    }
    let vertical_chains = |compound: &Arc<Crs>, other: &Arc<Crs>| {
        compound.is_compound()
            && other.is_vertical()
            && compound
                .extract_vertical_crs()
                .map_or(false, |v| v.is_equivalent_to(other, Criterion::Equivalent))
    };
    vertical_chains(previous_target, next_source) || vertical_chains(next_source, previous_target)
}

fn check_chaining(steps: &[Arc<CoordinateOperation>]) -> GeoResult<()> {
    for pair in steps.windows(2) {
        if let (Some(target), Some(source)) = (pair[0].target_crs(), pair[1].source_crs()) {
            if !chains(&target, &source) {
                return Err(GeoError::invalid_construction(
                    "串联操作",
                    format!(
                        "步骤 '{}' 的目标 '{}' 与步骤 '{}' 的源 '{}' 不相接",
                        pair[0].name(),
                        target.name(),
                        pair[1].name(),
                        source.name()
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn flatten_into(op: &Arc<CoordinateOperation>, out: &mut Vec<Arc<CoordinateOperation>>) {
    match op.kind() {
        OperationKind::Concatenated(steps) => {
            for step in steps {
                flatten_into(step, out);
            }
        }
        _ => out.push(op.clone()),
    }
}

fn is_inverse_pair(a: &Arc<CoordinateOperation>, b: &Arc<CoordinateOperation>) -> bool {
    a.inverse().is_equivalent_to(b, Criterion::Equivalent)
}

impl CoordinateOperation {
    /// 串联操作；至少两步且首尾相接
    pub fn create_concatenated(
        meta: ObjectMeta,
        steps: Vec<Arc<CoordinateOperation>>,
    ) -> GeoResult<Arc<Self>> {
        GeoError::check_construction(steps.len() >= 2, "串联操作", || {
            format!("至少需要两个步骤，实际 {}", steps.len())
        })?;
        check_chaining(&steps)?;
        let ballpark = steps.iter().any(|s| s.has_ballpark_transformation());
        Ok(Arc::new(assemble(meta, steps, Vec::new(), ballpark)))
    }

    /// 展平、消去相邻互逆步骤并计算元数据后串联
    ///
    /// 只剩一步时直接返回该步。名称以 " + " 连接，精度为各步之和
    /// （任一未知则未知），有效范围取交集。
    pub fn create_compute_metadata(steps: Vec<Arc<CoordinateOperation>>) -> GeoResult<Arc<Self>> {
        let mut flat = Vec::new();
        for step in &steps {
            flatten_into(step, &mut flat);
        }
        let mut kept: Vec<Arc<CoordinateOperation>> = Vec::with_capacity(flat.len());
        for step in flat {
            match kept.last() {
                Some(last) if is_inverse_pair(last, &step) => {
                    kept.pop();
                }
                _ => kept.push(step),
            }
        }
        Self::from_computed_steps(kept)
    }

    /// 串联已提升到复合 CRS 上的分量操作
    ///
    /// 不展平、不消去，只检查外层端点是否相接；元数据的计算同
    /// [`CoordinateOperation::create_compute_metadata`]。
    pub(crate) fn create_lifted_concatenation(
        steps: Vec<Arc<CoordinateOperation>>,
    ) -> GeoResult<Arc<Self>> {
        Self::from_computed_steps(steps)
    }

    fn from_computed_steps(mut kept: Vec<Arc<CoordinateOperation>>) -> GeoResult<Arc<Self>> {
        match kept.len() {
            0 => Err(GeoError::invalid_construction(
                "串联操作",
                "所有步骤相互抵消",
            )),
            1 => Ok(kept.remove(0)),
            _ => {
                let name = kept
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(" + ");
                let mut bbox: Option<GeographicBoundingBox> = None;
                for step in &kept {
                    if let Some(b) = step.domain_of_validity() {
                        bbox = match bbox {
                            None => Some(b),
                            Some(acc) => Some(acc.intersection(&b).ok_or_else(|| {
                                GeoError::invalid_construction(
                                    "串联操作",
                                    format!("'{name}' 各步骤的有效范围不相交"),
                                )
                            })?),
                        };
                    }
                }
                let mut meta = ObjectMeta::named(name);
                if let Some(b) = bbox {
                    meta = meta.with_extent(b);
                }
                Self::create_concatenated(meta, kept)
            }
        }
    }
}
