// geodex\crates\gx_geo\src\factory\lookup.rs
//! 注册表查询：直接操作、枢纽操作
//!
//! 查询失败记录为警告并视为没有候选。注册表操作的端点与请求的 CRS
//! 只差轴序或单位时，在前后补上纯转换。

use super::{concatenate, geodetic, vertical, Operations};
use crate::context::{IntermediateCrsUse, OperationContext};
use crate::crs::{Crs, CONFIDENCE_EQUIVALENT};
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::Identifier;
use crate::operation::CoordinateOperation;
use crate::registry::{Registry, RegistryResult};
use std::sync::Arc;

/// CRS 在注册表中的标识：自身带的权威标识，否则取识别置信度足够的候选
pub(super) fn candidate_ids(crs: &Arc<Crs>, registry: &dyn Registry) -> Vec<Identifier> {
    let own: Vec<Identifier> = crs
        .meta
        .identifiers
        .iter()
        .filter(|id| id.in_codespace(registry.authority()))
        .cloned()
        .collect();
    if !own.is_empty() {
        return own;
    }
    let mut ids: Vec<Identifier> = Vec::new();
    for (found, confidence) in crs.identify(registry) {
        if confidence < CONFIDENCE_EQUIVALENT {
            continue;
        }
        if let Some(id) = found.meta.identifier_in(registry.authority()) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

fn swallow<T: Default>(registry: &dyn Registry, result: RegistryResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::warn!("{}", err.into_geo(registry.authority()));
            T::default()
        }
    }
}

fn keep(op: &CoordinateOperation, ctx: &OperationContext) -> bool {
    if ctx.discard_superseded() && op.is_deprecated() {
        log::trace!("跳过已废弃的操作 '{}'", op.name());
        return false;
    }
    true
}

/// 同一基准内的纯转换（大地族或垂直）
fn pure_conversion(source: &Arc<Crs>, target: &Arc<Crs>) -> Option<Arc<CoordinateOperation>> {
    if !geodetic::same_datum(source, target) {
        return None;
    }
    if source.is_vertical() && target.is_vertical() {
        vertical::conversion_between(source, target)
    } else {
        geodetic::conversion_between(source, target)
    }
}

/// 让注册表操作的端点与请求的 CRS 对齐；无法对齐时返回 `None`
fn adapt(
    op: Arc<CoordinateOperation>,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
) -> Option<Arc<CoordinateOperation>> {
    let (op_source, op_target) = (op.source_crs()?, op.target_crs()?);
    let mut steps = Vec::with_capacity(3);
    if !op_source.is_equivalent_to(source, Criterion::Equivalent) {
        match pure_conversion(source, &op_source) {
            Some(step) => steps.push(step),
            None => {
                log::trace!("'{}' 的源端无法与 '{}' 对齐", op.name(), source.name());
                return None;
            }
        }
    }
    let adapted = !steps.is_empty();
    steps.push(op.clone());
    if !op_target.is_equivalent_to(target, Criterion::Equivalent) {
        match pure_conversion(&op_target, target) {
            Some(step) => steps.push(step),
            None => {
                log::trace!("'{}' 的目标端无法与 '{}' 对齐", op.name(), target.name());
                return None;
            }
        }
    }
    if !adapted && steps.len() == 1 {
        return Some(op);
    }
    concatenate(steps)
}

/// 注册表中 `source` 到 `target` 的操作（含反向登记操作的逆）
pub(super) fn registry_operations(
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let Some(registry) = ctx.registry() else {
        return Vec::new();
    };
    let src_ids = candidate_ids(source, registry);
    let tgt_ids = candidate_ids(target, registry);
    let mut raw = Vec::new();
    for s in &src_ids {
        for t in &tgt_ids {
            if s == t {
                continue;
            }
            raw.extend(
                swallow(registry, registry.operations_between(s, t))
                    .into_iter()
                    .filter(|op| keep(op, ctx)),
            );
            raw.extend(
                swallow(registry, registry.operations_between(t, s))
                    .into_iter()
                    .filter(|op| keep(op, ctx))
                    .map(|op| op.inverse()),
            );
        }
    }
    let ops: Operations = raw
        .into_iter()
        .filter_map(|op| adapt(op, source, target))
        .collect();
    log::debug!(
        "注册表 {}: '{}' -> '{}' 直接操作 {} 个",
        registry.authority(),
        source.name(),
        target.name(),
        ops.len()
    );
    ops
}

fn endpoint_id(crs: Option<Arc<Crs>>, authority: &str) -> Option<Identifier> {
    crs.and_then(|c| c.meta.identifier_in(authority).cloned())
}

/// 经由中间 CRS 的两段操作
pub(super) fn pivot_operations(
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let Some(registry) = ctx.registry() else {
        return Vec::new();
    };
    let authority = registry.authority();
    let src_ids = candidate_ids(source, registry);
    let tgt_ids = candidate_ids(target, registry);
    if src_ids.is_empty() || tgt_ids.is_empty() {
        return Vec::new();
    }
    let mut results = Vec::new();
    for s in &src_ids {
        for op in swallow(registry, registry.operations_involving(s)) {
            if !keep(&op, ctx) {
                continue;
            }
            let (first, pivot) = if endpoint_id(op.source_crs(), authority).as_ref() == Some(s) {
                (op.clone(), op.target_crs())
            } else {
                (op.inverse(), op.source_crs())
            };
            let Some(pivot) = pivot else { continue };
            let Some(pivot_id) = pivot.meta.identifier_in(authority) else {
                continue;
            };
            if src_ids.contains(pivot_id) || tgt_ids.contains(pivot_id) {
                continue;
            }
            if !ctx.is_intermediate_allowed(&pivot) {
                log::trace!("中间 CRS '{}' 不在允许列表中", pivot.name());
                continue;
            }
            let second = registry_operations(&pivot, target, ctx);
            if second.is_empty() {
                continue;
            }
            let Some(first) = adapt(first, source, &pivot) else {
                continue;
            };
            log::trace!(
                "经由 '{}' 的候选: {} 个后段操作",
                pivot.name(),
                second.len()
            );
            results.extend(
                second
                    .into_iter()
                    .filter_map(|leg| concatenate(vec![first.clone(), leg])),
            );
        }
    }
    results
}

/// 按中间 CRS 策略组合直接操作与枢纽操作
pub(super) fn direct_and_pivot(
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let mut results = registry_operations(source, target, ctx);
    let use_pivot = match ctx.intermediate_crs_use() {
        IntermediateCrsUse::Always => true,
        IntermediateCrsUse::IfNoDirectTransformation => results.is_empty(),
        IntermediateCrsUse::Never => false,
    };
    if use_pivot {
        results.extend(pivot_operations(source, target, ctx));
    }
    results
}

/// 注册表中连接地理 3D CRS 与该垂直 CRS 的操作，统一为 地理 3D → 垂直 方向
pub(super) fn geographic_3d_links(vertical_crs: &Arc<Crs>, ctx: &OperationContext) -> Operations {
    let Some(registry) = ctx.registry() else {
        return Vec::new();
    };
    let authority = registry.authority();
    let ids = candidate_ids(vertical_crs, registry);
    let mut links = Vec::new();
    for id in &ids {
        for op in swallow(registry, registry.operations_involving(id)) {
            if !keep(&op, ctx) {
                continue;
            }
            let oriented = if endpoint_id(op.target_crs(), authority).as_ref() == Some(id) {
                op.clone()
            } else {
                op.inverse()
            };
            let geographic = oriented
                .source_crs()
                .map_or(false, |crs| crs.is_geographic_3d());
            if geographic {
                links.push(oriented.rebound(None, Some(vertical_crs.clone())));
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::metadata::{ObjectMeta, PositionalAccuracy};
    use crate::registry::{InMemoryRegistry, RegistryError};

    fn translation() -> Arc<CoordinateOperation> {
        CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("NTF (Paris) to WGS 84 (1)").with_epsg(8094),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            -168.0,
            -60.0,
            320.0,
            Some(PositionalAccuracy::new(2.0).unwrap()),
        )
    }

    fn ctx_with(registry: InMemoryRegistry) -> OperationContext {
        OperationContext::new().with_registry(Arc::new(registry))
    }

    #[test]
    fn test_candidate_ids() {
        let registry = InMemoryRegistry::with_epsg_defaults();
        assert_eq!(
            candidate_ids(&wellknown::epsg_4807(), &registry),
            vec![Identifier::epsg(4807)]
        );
        // 改名后标识被清空，靠识别找回
        let renamed = wellknown::epsg_4979().alter_name("WGS 84");
        assert_eq!(candidate_ids(&renamed, &registry), vec![Identifier::epsg(4979)]);
        assert!(candidate_ids(&wellknown::local_engineering(), &registry).is_empty());
    }

    #[test]
    fn test_registry_operations_both_directions() {
        let ctx = ctx_with(InMemoryRegistry::with_epsg_defaults().with_operation(translation()));
        let forward = registry_operations(&wellknown::epsg_4807(), &wellknown::epsg_4326(), &ctx);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].accuracy(), Some(2.0));
        let backward = registry_operations(&wellknown::epsg_4326(), &wellknown::epsg_4807(), &ctx);
        assert_eq!(backward.len(), 1);
        assert_eq!(
            backward[0].source_crs().unwrap().name(),
            "WGS 84"
        );
    }

    #[test]
    fn test_adapt_axis_order() {
        let ctx = ctx_with(InMemoryRegistry::with_epsg_defaults().with_operation(translation()));
        let ops = registry_operations(&wellknown::epsg_4807(), &wellknown::ogc_crs84(), &ctx);
        // CRS84 不在 EPSG 注册表中，按名称也找不到
        assert!(ops.is_empty());

        let adapted = adapt(translation(), &wellknown::epsg_4807(), &wellknown::ogc_crs84()).unwrap();
        assert_eq!(adapted.steps().len(), 2);
        assert_eq!(adapted.steps()[1].name(), "axis order change (2D)");
        assert!(adapt(translation(), &wellknown::epsg_4326(), &wellknown::ogc_crs84()).is_none());
    }

    #[test]
    fn test_deprecated_are_skipped() {
        let deprecated = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("old").with_epsg(1).deprecated(),
            wellknown::epsg_4807(),
            wellknown::epsg_4326(),
            0.0,
            0.0,
            0.0,
            None,
        );
        let ctx = ctx_with(InMemoryRegistry::with_epsg_defaults().with_operation(deprecated));
        assert!(registry_operations(&wellknown::epsg_4807(), &wellknown::epsg_4326(), &ctx).is_empty());
    }

    #[test]
    fn test_pivot() {
        let nad27 = Crs::geographic(
            ObjectMeta::named("NAD27").with_epsg(4267),
            wellknown::datum_nad27(),
            crate::cs::CoordinateSystem::ellipsoidal_lat_long(crate::units::UnitOfMeasure::DEGREE),
        )
        .unwrap();
        let leg = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("NAD27 to WGS 84 (1)").with_epsg(1173),
            nad27.clone(),
            wellknown::epsg_4326(),
            -8.0,
            160.0,
            176.0,
            Some(PositionalAccuracy::new(10.0).unwrap()),
        );
        let registry = InMemoryRegistry::with_epsg_defaults()
            .with_operation(translation())
            .with_operation(leg);
        let ctx = ctx_with(registry);
        let ops = direct_and_pivot(&wellknown::epsg_4807(), &nad27, &ctx);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].accuracy(), Some(12.0));
        assert_eq!(ops[0].steps().len(), 2);

        let never = ctx.clone().with_intermediate_crs_use(IntermediateCrsUse::Never);
        assert!(direct_and_pivot(&wellknown::epsg_4807(), &nad27, &never).is_empty());

        let restricted = ctx.with_allowed_intermediate_crs(vec![Identifier::epsg(4258)]);
        assert!(direct_and_pivot(&wellknown::epsg_4807(), &nad27, &restricted).is_empty());
    }

    struct Broken;

    impl Registry for Broken {
        fn authority(&self) -> &str {
            "EPSG"
        }
        fn operations_between(&self, _: &Identifier, _: &Identifier) -> RegistryResult<Operations> {
            Err(RegistryError::Backend("断开".into()))
        }
        fn operations_involving(&self, _: &Identifier) -> RegistryResult<Operations> {
            Err(RegistryError::Backend("断开".into()))
        }
        fn crs_by_identifier(&self, id: &Identifier) -> RegistryResult<Arc<Crs>> {
            Err(RegistryError::not_found(id.to_string()))
        }
        fn crs_by_name(&self, _: &str, _: bool) -> RegistryResult<Vec<Arc<Crs>>> {
            Err(RegistryError::Backend("断开".into()))
        }
        fn ensemble_members(
            &self,
            _: &Identifier,
        ) -> RegistryResult<Vec<Arc<crate::datum::Datum>>> {
            Ok(Vec::new())
        }
        fn resolve_alias(&self, _: &str, _: &str) -> RegistryResult<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_registry_errors_are_swallowed() {
        let ctx = OperationContext::new().with_registry(Arc::new(Broken));
        assert!(direct_and_pivot(&wellknown::epsg_4807(), &wellknown::epsg_4326(), &ctx).is_empty());
    }
}
