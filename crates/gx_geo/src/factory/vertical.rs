// geodex\crates\gx_geo\src\factory\vertical.rs
//! 垂直 CRS 之间、地理 3D 与垂直 CRS 之间的操作
//!
//! 大地水准面模型（geoid model）给出 地理 3D → 垂直 的格网变换；两个垂直 CRS
//! 的模型共用插值 CRS 时经由该地理 3D CRS 桥接。

use super::{concatenate, geodetic, invert_all, lookup, CoordinateOperationFactory, Operations};
use crate::context::OperationContext;
use crate::crs::{Crs, GeoidModel};
use crate::cs::{AxisDirection, CoordinateSystem};
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::ObjectMeta;
use crate::operation::CoordinateOperation;
use crate::units::UNIT_RELATIVE_TOLERANCE;
use std::sync::Arc;

pub(super) fn search(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    if source.is_vertical() && target.is_vertical() {
        vertical_to_vertical(source, target, ctx)
    } else if source.is_geographic_3d() && target.is_vertical() {
        geographic_to_vertical(factory, source, target, ctx)
    } else if source.is_vertical() && target.is_geographic_3d() {
        invert_all(geographic_to_vertical(factory, target, source, ctx))
    } else {
        log::debug!(
            "'{}' 与 '{}' 之间没有垂直操作",
            source.name(),
            target.name()
        );
        Vec::new()
    }
}

// ============================================================================
// 垂直 ↔ 垂直
// ============================================================================

fn vertical_to_vertical(source: &Arc<Crs>, target: &Arc<Crs>, ctx: &OperationContext) -> Operations {
    let mut results = lookup::direct_and_pivot(source, target, ctx);
    if geodetic::same_datum(source, target) {
        results.extend(conversion_between(source, target));
        return results;
    }
    for from in source.geoid_models() {
        for to in target.geoid_models() {
            if !from
                .interpolation_crs
                .is_equivalent_to(&to.interpolation_crs, Criterion::Equivalent)
            {
                continue;
            }
            let bridged = geoid_operation(from, source)
                .zip(geoid_operation(to, target))
                .and_then(|(down, up)| concatenate(vec![down.inverse(), up]));
            if let Some(op) = bridged {
                log::trace!("经由 '{}' 桥接垂直 CRS", from.interpolation_crs.name());
                results.push(op);
            }
        }
    }
    if results.is_empty() {
        results.push(CoordinateOperation::create_ballpark_vertical(
            source.clone(),
            target.clone(),
        ));
    }
    results
}

/// 同一基准内两个垂直 CRS 之间的单位变化与方向翻转
pub(super) fn conversion_between(
    source: &Arc<Crs>,
    target: &Arc<Crs>,
) -> Option<Arc<CoordinateOperation>> {
    if source.is_equivalent_to(target, Criterion::Equivalent) {
        return None;
    }
    let from = source.coordinate_system()?.axes().first()?;
    let to = target.coordinate_system()?.axes().first()?;
    let ratio = from.unit.conversion_to_si() / to.unit.conversion_to_si();
    let unit_change = (ratio - 1.0).abs() > UNIT_RELATIVE_TOLERANCE;
    let flip = from.direction != to.direction;

    let change_unit = |src: &Arc<Crs>, tgt: &Arc<Crs>| match CoordinateOperation::create_change_vertical_unit(ratio) {
        Ok(op) => Some(op.with_endpoints(src.clone(), tgt.clone())),
        Err(err) => {
            log::warn!("无法构造垂直单位变化: {err}");
            None
        }
    };
    let reverse = |src: &Arc<Crs>, tgt: &Arc<Crs>| {
        CoordinateOperation::create_height_depth_reversal().with_endpoints(src.clone(), tgt.clone())
    };

    match (unit_change, flip) {
        (false, false) => None,
        (true, false) => change_unit(source, target),
        (false, true) => Some(reverse(source, target)),
        (true, true) => {
            // 先换单位，再翻转方向
            let cs = if from.direction == AxisDirection::Down {
                CoordinateSystem::depth(to.unit.clone())
            } else {
                CoordinateSystem::gravity_related_height(to.unit.clone())
            };
            let meta = ObjectMeta::named(format!("{} ({})", source.name(), to.unit.name()));
            let interm = match Crs::vertical(meta, source.datum_source()?.clone(), cs) {
                Ok(crs) => crs,
                Err(err) => {
                    log::warn!("无法构造 '{}' 的中间垂直 CRS: {err}", source.name());
                    return None;
                }
            };
            let first = change_unit(source, &interm)?;
            concatenate(vec![first, reverse(&interm, target)])
        }
    }
}

// ============================================================================
// 大地水准面
// ============================================================================

/// 模型给出的 插值 CRS → `target` 格网变换
///
/// `target` 为垂直 CRS 或含垂直分量的复合 CRS。
pub(super) fn geoid_operation(model: &GeoidModel, target: &Arc<Crs>) -> Option<Arc<CoordinateOperation>> {
    match CoordinateOperation::create_geographic_3d_to_gravity_related_height(
        model.meta.clone(),
        model.interpolation_crs.clone(),
        target.clone(),
        &model.grid_file,
        model.accuracy,
    ) {
        Ok(op) => Some(op),
        Err(err) => {
            log::warn!("大地水准面模型 '{}' 不可用: {err}", model.meta.name);
            None
        }
    }
}

fn geographic_to_vertical(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let mut results = lookup::direct_and_pivot(source, target, ctx);
    for model in target.geoid_models() {
        let Some(forward) = geoid_operation(model, target) else {
            continue;
        };
        if model
            .interpolation_crs
            .is_equivalent_to(source, Criterion::Equivalent)
        {
            results.push(forward);
            continue;
        }
        results.extend(
            factory
                .search(source, &model.interpolation_crs, ctx)
                .into_iter()
                .filter_map(|head| concatenate(vec![head, forward.clone()])),
        );
    }
    if results.is_empty() {
        log::debug!(
            "'{}' 到 '{}' 没有大地水准面模型，使用粗略垂直操作",
            source.name(),
            target.name()
        );
        results.push(CoordinateOperation::create_ballpark_vertical(
            source.clone(),
            target.clone(),
        ));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::datum::Datum;
    use crate::units::UnitOfMeasure;

    fn egm96_with_geoid() -> Arc<Crs> {
        Crs::vertical_with_geoids(
            ObjectMeta::named("EGM96 height").with_epsg(5773),
            wellknown::datum_egm96(),
            CoordinateSystem::gravity_related_height(UnitOfMeasure::METRE),
            vec![GeoidModel::new(
                ObjectMeta::named("WGS 84 to EGM96 height (1)").with_epsg(10084),
                "egm96_15.gtx",
                wellknown::epsg_4979(),
            )
            .unwrap()],
        )
        .unwrap()
    }

    fn navd88(with_geoid: bool) -> Arc<Crs> {
        let models = if with_geoid {
            vec![GeoidModel::new(
                ObjectMeta::named("GEOID12B"),
                "g2012bu0.gtx",
                wellknown::epsg_4979(),
            )
            .unwrap()]
        } else {
            Vec::new()
        };
        Crs::vertical_with_geoids(
            ObjectMeta::named("NAVD88 height").with_epsg(5703),
            Arc::new(Datum::vertical(ObjectMeta::named("North American Vertical Datum 1988"))),
            CoordinateSystem::gravity_related_height(UnitOfMeasure::METRE),
            models,
        )
        .unwrap()
    }

    fn egm96_in(unit: UnitOfMeasure, depth: bool) -> Arc<Crs> {
        let cs = if depth {
            CoordinateSystem::depth(unit)
        } else {
            CoordinateSystem::gravity_related_height(unit)
        };
        Crs::vertical(ObjectMeta::named("EGM96 variant"), wellknown::datum_egm96(), cs).unwrap()
    }

    fn run(source: &Arc<Crs>, target: &Arc<Crs>) -> Operations {
        search(&CoordinateOperationFactory::new(), source, target, &OperationContext::new())
    }

    #[test]
    fn test_unit_change() {
        let ops = run(&wellknown::egm96_height(), &egm96_in(UnitOfMeasure::FOOT, false));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Change of Vertical Unit");
        assert_eq!(
            ops[0].to_pipeline_string().unwrap(),
            "+proj=unitconvert +z_in=m +z_out=ft"
        );
    }

    #[test]
    fn test_height_depth() {
        let ops = run(&wellknown::egm96_height(), &wellknown::egm96_depth());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].to_pipeline_string().unwrap(), "+proj=axisswap +order=1,2,-3");

        let both = conversion_between(&wellknown::egm96_height(), &egm96_in(UnitOfMeasure::FOOT, true)).unwrap();
        assert_eq!(both.steps().len(), 2);
        assert_eq!(both.steps()[0].name(), "Change of Vertical Unit");
        assert_eq!(both.steps()[1].name(), "Height Depth Reversal");
        assert_eq!(both.steps()[0].target_crs().unwrap().name(), "EGM96 height (foot)");
    }

    #[test]
    fn test_geoid_bridge() {
        let ops = run(&egm96_with_geoid(), &navd88(true));
        assert_eq!(ops.len(), 1);
        assert!(!ops[0].has_ballpark_transformation());
        assert_eq!(
            ops[0].grid_names(),
            vec!["egm96_15.gtx".to_string(), "g2012bu0.gtx".to_string()]
        );
    }

    #[test]
    fn test_ballpark_between_datums() {
        let ops = run(&wellknown::egm96_height(), &navd88(false));
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0].name(),
            "Ballpark vertical transformation from EGM96 height to NAVD88 height"
        );
        assert!(ops[0].has_ballpark_transformation());
    }

    #[test]
    fn test_geographic_to_vertical() {
        let ops = run(&wellknown::epsg_4979(), &egm96_with_geoid());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "WGS 84 to EGM96 height (1)");
        assert!(ops[0]
            .to_pipeline_string()
            .unwrap()
            .contains("+inv +proj=vgridshift +grids=egm96_15.gtx +multiplier=1"));

        let back = run(&egm96_with_geoid(), &wellknown::epsg_4979());
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].target_crs().unwrap().name(), "WGS 84");
    }

    #[test]
    fn test_unrelated_kinds() {
        assert!(run(&wellknown::egm96_height(), &wellknown::epsg_4326()).is_empty());
    }
}
