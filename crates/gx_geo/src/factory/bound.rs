// geodex\crates\gx_geo\src\factory\bound.rs
//! 绑定 CRS：利用附带的到枢纽 CRS 的变换

use super::{concatenate, invert_all, lookup, ranking, CoordinateOperationFactory, Operations};
use crate::context::OperationContext;
use crate::crs::{BoundCrs, Crs};
use crate::equivalence::{Criterion, Equivalence};
use crate::operation::CoordinateOperation;
use std::sync::Arc;

pub(super) fn search(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    match (source.as_bound(), target.as_bound()) {
        (Some(from), Some(to)) => both_bound(factory, from, to, ctx),
        (Some(from), None) => from_bound(factory, from, target, ctx),
        (None, Some(_)) => invert_all(search(factory, target, source, ctx)),
        (None, None) => Vec::new(),
    }
}

fn hubs_match(a: &Crs, b: &Crs) -> bool {
    a.is_equivalent_to(b, Criterion::EquivalentIgnoringAxisOrderForGeographic)
}

/// 连接段：两端等价时为空；否则取排序后最优的一个操作，没有则为 `None`
fn leg(
    factory: &CoordinateOperationFactory,
    from: &Arc<Crs>,
    to: &Arc<Crs>,
    ctx: &OperationContext,
) -> Option<Vec<Arc<CoordinateOperation>>> {
    if from.is_equivalent_to(to, Criterion::Equivalent) {
        return Some(Vec::new());
    }
    let candidates = factory.search(from, to, ctx);
    let best = ranking::rank(candidates, from, to, ctx).into_iter().next();
    if best.is_none() {
        log::debug!("'{}' 与 '{}' 之间没有连接段", from.name(), to.name());
    }
    best.map(|op| vec![op])
}

/// 基础 CRS → 变换源端 的连接段与变换本身
fn into_hub(
    factory: &CoordinateOperationFactory,
    bound: &BoundCrs,
    ctx: &OperationContext,
) -> Option<Vec<Arc<CoordinateOperation>>> {
    let transformation = bound.transformation();
    let start = transformation.source_crs()?;
    let mut steps = leg(factory, bound.base(), &start, ctx)?;
    steps.push(transformation.clone());
    Some(steps)
}

/// 枢纽 → 基础 CRS：`into_hub` 的逆
fn out_of_hub(
    factory: &CoordinateOperationFactory,
    bound: &BoundCrs,
    ctx: &OperationContext,
) -> Option<Vec<Arc<CoordinateOperation>>> {
    let transformation = bound.transformation();
    let end = transformation.source_crs()?;
    let mut steps = vec![transformation.inverse()];
    steps.extend(leg(factory, &end, bound.base(), ctx)?);
    Some(steps)
}

fn from_bound(
    factory: &CoordinateOperationFactory,
    bound: &BoundCrs,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let Some(head) = into_hub(factory, bound, ctx) else {
        return Vec::new();
    };
    let Some(hub_end) = bound.transformation().target_crs() else {
        return Vec::new();
    };

    if hubs_match(bound.hub(), target) {
        let Some(tail) = leg(factory, &hub_end, target, ctx) else {
            return Vec::new();
        };
        log::trace!("枢纽 '{}' 即目标", bound.hub().name());
        return concatenate(head.into_iter().chain(tail).collect())
            .into_iter()
            .collect();
    }

    let direct = lookup::registry_operations(bound.base(), target, ctx);
    if !direct.is_empty() {
        log::trace!("'{}' 使用注册表中的直接操作", bound.base().name());
        return direct;
    }

    factory
        .search(&hub_end, target, ctx)
        .into_iter()
        .filter_map(|op| concatenate(head.iter().cloned().chain([op]).collect()))
        .collect()
}

fn both_bound(
    factory: &CoordinateOperationFactory,
    from: &BoundCrs,
    to: &BoundCrs,
    ctx: &OperationContext,
) -> Operations {
    if hubs_match(from.hub(), to.hub())
        && from
            .transformation()
            .is_equivalent_to(to.transformation(), Criterion::Equivalent)
    {
        return factory.search(from.base(), to.base(), ctx);
    }
    let (Some(head), Some(tail)) = (into_hub(factory, from, ctx), out_of_hub(factory, to, ctx)) else {
        return Vec::new();
    };
    let (Some(hub_start), Some(hub_end)) = (
        from.transformation().target_crs(),
        to.transformation().target_crs(),
    ) else {
        return Vec::new();
    };

    let bridges: Vec<Vec<Arc<CoordinateOperation>>> = if hubs_match(&hub_start, &hub_end) {
        leg(factory, &hub_start, &hub_end, ctx).into_iter().collect()
    } else {
        factory
            .search(&hub_start, &hub_end, ctx)
            .into_iter()
            .map(|op| vec![op])
            .collect()
    };
    bridges
        .into_iter()
        .filter_map(|bridge| {
            let steps = head
                .iter()
                .cloned()
                .chain(bridge)
                .chain(tail.iter().cloned())
                .collect();
            concatenate(steps)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::cs::CoordinateSystem;
    use crate::metadata::{ObjectMeta, PositionalAccuracy};
    use crate::registry::InMemoryRegistry;
    use crate::units::UnitOfMeasure;

    fn ntf_bound() -> Arc<Crs> {
        Crs::create_bound_to_wgs84(wellknown::epsg_4807(), &[-168.0, -60.0, 320.0]).unwrap()
    }

    fn nad27_bound() -> Arc<Crs> {
        let nad27 = Crs::geographic(
            ObjectMeta::named("NAD27").with_epsg(4267),
            wellknown::datum_nad27(),
            CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE),
        )
        .unwrap();
        Crs::create_bound_to_wgs84(nad27, &[-8.0, 160.0, 176.0]).unwrap()
    }

    fn run(source: &Arc<Crs>, target: &Arc<Crs>, ctx: &OperationContext) -> Operations {
        search(&CoordinateOperationFactory::new(), source, target, ctx)
    }

    #[test]
    fn test_bound_to_hub() {
        let ops = run(&ntf_bound(), &wellknown::epsg_4326(), &OperationContext::new());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Transformation from NTF (Paris) to WGS84");
        assert!(!ops[0].has_ballpark_transformation());
        let pipeline = ops[0].to_pipeline_string().unwrap();
        assert!(pipeline.contains("+proj=helmert +x=-168 +y=-60 +z=320"));
        assert!(pipeline.contains("+proj=push +v_3"));
    }

    #[test]
    fn test_bound_to_hub_variant() {
        let ops = run(&ntf_bound(), &wellknown::ogc_crs84(), &OperationContext::new());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].steps().len(), 2);
        assert_eq!(ops[0].steps()[1].name(), "axis order change (2D)");
    }

    #[test]
    fn test_bound_through_hub() {
        let ops = run(&ntf_bound(), &wellknown::epsg_4979(), &OperationContext::new());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].steps().len(), 2);
        assert_eq!(
            ops[0].steps()[1].name(),
            "Conversion from WGS 84 (geog2D) to WGS 84 (geog3D)"
        );
    }

    #[test]
    fn test_registry_preferred() {
        let registered = CoordinateOperation::create_geocentric_translations(
            ObjectMeta::named("NTF (Paris) to WGS 84 (1)").with_epsg(8094),
            wellknown::epsg_4807(),
            wellknown::epsg_4979(),
            -168.0,
            -60.0,
            320.0,
            Some(PositionalAccuracy::new(2.0).unwrap()),
        );
        let ctx = OperationContext::new().with_registry(Arc::new(
            InMemoryRegistry::with_epsg_defaults().with_operation(registered),
        ));
        let ops = run(&ntf_bound(), &wellknown::epsg_4979(), &ctx);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "NTF (Paris) to WGS 84 (1)");
    }

    #[test]
    fn test_bound_target_is_inverse() {
        let ops = run(&wellknown::epsg_4326(), &ntf_bound(), &OperationContext::new());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].source_crs().unwrap().name(), "WGS 84");
        assert_eq!(ops[0].target_crs().unwrap().name(), "NTF (Paris)");
    }

    #[test]
    fn test_two_bound_same_hub() {
        let ops = run(&ntf_bound(), &nad27_bound(), &OperationContext::new());
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.steps().len(), 2);
        assert_eq!(op.source_crs().unwrap().name(), "NTF (Paris)");
        assert_eq!(op.target_crs().unwrap().name(), "NAD27");
        let pipeline = op.to_pipeline_string().unwrap();
        assert!(pipeline.contains("+proj=helmert +x=-168 +y=-60 +z=320"));
        assert!(pipeline.contains("+ellps=clrk66"));
    }

    #[test]
    fn test_two_bound_same_transformation() {
        let tr = ntf_bound().as_bound().unwrap().transformation().clone();
        let renamed = Crs::bound(
            wellknown::epsg_4807().alter_name("NTF (Paris) copy"),
            wellknown::epsg_4326(),
            tr,
        )
        .unwrap();
        let ops = run(&ntf_bound(), &renamed, &OperationContext::new());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].to_pipeline_string().unwrap(), "+proj=noop");
    }
}
