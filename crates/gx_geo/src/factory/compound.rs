// geodex\crates\gx_geo\src\factory\compound.rs
//! 复合 CRS（水平 + 垂直）
//!
//! 水平与垂直分量分别求解，再提升（rebound）到复合 CRS 上串联。
//! 提升后的串联不再展平，否则内层步骤的端点无法首尾相接。

use super::{
    concatenate_lifted, invert_all, lookup, vertical, CoordinateOperationFactory, Operations,
};
use crate::context::OperationContext;
use crate::crs::Crs;
use crate::cs::CoordinateSystem;
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::ObjectMeta;
use crate::operation::CoordinateOperation;
use crate::units::UnitOfMeasure;
use std::sync::Arc;

pub(super) fn search(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    match (source.is_compound(), target.is_compound()) {
        (true, true) => compound_to_compound(factory, source, target, ctx),
        (true, false) => from_compound(factory, source, target, ctx),
        (false, true) => invert_all(from_compound(factory, target, source, ctx)),
        (false, false) => Vec::new(),
    }
}

fn equivalent(a: &Crs, b: &Crs) -> bool {
    a.is_equivalent_to(b, Criterion::Equivalent)
}

/// 由水平与垂直分量组成的中间复合 CRS
fn compound_of(horizontal: &Arc<Crs>, vertical_crs: &Arc<Crs>) -> Option<Arc<Crs>> {
    let meta = ObjectMeta::named(format!("{} + {}", horizontal.name(), vertical_crs.name()));
    match Crs::compound(meta, vec![horizontal.clone(), vertical_crs.clone()]) {
        Ok(crs) => Some(crs),
        Err(err) => {
            log::warn!("无法构造中间复合 CRS: {err}");
            None
        }
    }
}

/// 将分量操作提升到给定端点
fn lift(ops: Operations, source: &Arc<Crs>, target: Option<&Arc<Crs>>) -> Vec<Option<Arc<CoordinateOperation>>> {
    ops.iter()
        .map(|op| Some(op.rebound(Some(source.clone()), target.cloned())))
        .collect()
}

fn join(
    heads: &[Option<Arc<CoordinateOperation>>],
    middle: Option<&Arc<CoordinateOperation>>,
    tails: &[Option<Arc<CoordinateOperation>>],
) -> Operations {
    let mut results = Vec::new();
    for head in heads {
        for tail in tails {
            let steps: Vec<_> = head
                .iter()
                .chain(middle)
                .chain(tail.iter())
                .cloned()
                .collect();
            if steps.is_empty() {
                continue;
            }
            results.extend(concatenate_lifted(steps));
        }
    }
    results
}

// ============================================================================
// 复合 → 非复合
// ============================================================================

fn from_compound(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let Some(compound) = source.as_compound() else {
        return Vec::new();
    };
    if target.is_geographic_3d() {
        return to_geographic_3d(factory, source, target, ctx);
    }
    if target.is_geocentric() {
        return to_geocentric(factory, source, target, ctx);
    }
    let component = if target.is_vertical() {
        source.extract_vertical_crs()
    } else {
        Some(compound.horizontal().clone())
    };
    let Some(component) = component else {
        return Vec::new();
    };
    log::trace!(
        "'{}' -> '{}' 只使用分量 '{}'",
        source.name(),
        target.name(),
        component.name()
    );
    factory
        .search(&component, target, ctx)
        .iter()
        .map(|op| op.rebound(Some(source.clone()), None))
        .collect()
}

/// 复合 → 地理 3D：水平段（提升）+ 逆大地水准面变换 + 地理 3D 段
fn to_geographic_3d(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let (Some(compound), Some(vertical_crs)) = (source.as_compound(), source.extract_vertical_crs())
    else {
        return Vec::new();
    };
    let horizontal = compound.horizontal().clone();

    let mut links: Operations = vertical_crs
        .geoid_models()
        .iter()
        .filter_map(|model| vertical::geoid_operation(model, &vertical_crs))
        .collect();
    links.extend(lookup::geographic_3d_links(&vertical_crs, ctx));

    let mut results = Vec::new();
    for link in &links {
        let Some(geographic) = link.source_crs() else {
            continue;
        };
        let geographic_2d = geographic.demote_to_2d(None);
        let (lifted, heads) = if equivalent(&horizontal, &geographic_2d) {
            (source.clone(), vec![None])
        } else {
            let Some(lifted) = compound_of(&geographic_2d, &vertical_crs) else {
                continue;
            };
            let heads = lift(
                factory.search(&horizontal, &geographic_2d, ctx),
                source,
                Some(&lifted),
            );
            (lifted, heads)
        };
        let geoid = link
            .rebound(Some(geographic.clone()), Some(lifted))
            .inverse();
        let tails = if equivalent(&geographic, target) {
            vec![None]
        } else {
            factory
                .search(&geographic, target, ctx)
                .into_iter()
                .map(Some)
                .collect()
        };
        results.extend(join(&heads, Some(&geoid), &tails));
    }

    if results.is_empty() {
        log::debug!(
            "'{}' 没有可用的大地水准面模型，垂直分量使用粗略操作",
            vertical_crs.name()
        );
        let target_2d = target.demote_to_2d(None);
        let (lifted, heads) = if equivalent(&horizontal, &target_2d) {
            (source.clone(), vec![None])
        } else {
            let Some(lifted) = compound_of(&target_2d, &vertical_crs) else {
                return results;
            };
            let heads = lift(factory.search(&horizontal, &target_2d, ctx), source, Some(&lifted));
            (lifted, heads)
        };
        let ballpark = CoordinateOperation::create_ballpark_vertical(lifted, target.clone());
        results = join(&heads, Some(&ballpark), &[None]);
    }
    results
}

/// 复合 → 地心：经由同基准的地理 3D CRS
fn to_geocentric(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let Some(datum) = target.datum_source() else {
        return Vec::new();
    };
    let geographic_3d = match Crs::geographic(
        ObjectMeta::named(target.name()),
        datum.clone(),
        CoordinateSystem::ellipsoidal_lat_long_h(UnitOfMeasure::DEGREE, UnitOfMeasure::METRE),
    ) {
        Ok(crs) => crs,
        Err(err) => {
            log::warn!("无法构造 '{}' 的地理 3D CRS: {err}", target.name());
            return Vec::new();
        }
    };
    let tail = CoordinateOperation::create_geographic_geocentric(geographic_3d.clone(), target.clone());
    to_geographic_3d(factory, source, &geographic_3d, ctx)
        .into_iter()
        .filter_map(|op| concatenate_lifted(vec![op, tail.clone()]))
        .collect()
}

// ============================================================================
// 复合 → 复合
// ============================================================================

/// 先在源水平分量上求垂直段，再在目标垂直分量上求水平段
fn compound_to_compound(
    factory: &CoordinateOperationFactory,
    source: &Arc<Crs>,
    target: &Arc<Crs>,
    ctx: &OperationContext,
) -> Operations {
    let (Some(from), Some(to)) = (source.as_compound(), target.as_compound()) else {
        return Vec::new();
    };
    let (h1, h2) = (from.horizontal().clone(), to.horizontal().clone());
    let (Some(v1), Some(v2)) = (source.extract_vertical_crs(), target.extract_vertical_crs()) else {
        return lift(factory.search(&h1, &h2, ctx), source, Some(target))
            .into_iter()
            .flatten()
            .collect();
    };

    let (interm, verticals) = if equivalent(&v1, &v2) {
        (source.clone(), vec![None])
    } else {
        let Some(interm) = compound_of(&h1, &v2) else {
            return Vec::new();
        };
        let ops = lift(factory.search(&v1, &v2, ctx), source, Some(&interm));
        (interm, ops)
    };
    let horizontals = if equivalent(&h1, &h2) {
        vec![None]
    } else {
        lift(factory.search(&h1, &h2, ctx), &interm, Some(target))
    };

    let mut results = Vec::new();
    for v in &verticals {
        for h in &horizontals {
            match (v, h) {
                (None, None) => results.push(CoordinateOperation::create_null(
                    source.clone(),
                    target.clone(),
                )),
                (Some(op), None) => results.push(op.rebound(None, Some(target.clone()))),
                (None, Some(op)) => results.push(op.rebound(Some(source.clone()), None)),
                (Some(a), Some(b)) => results.extend(concatenate_lifted(vec![a.clone(), b.clone()])),
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{wellknown, GeoidModel};

    fn egm96(with_geoid: bool) -> Arc<Crs> {
        let models = if with_geoid {
            vec![GeoidModel::new(
                ObjectMeta::named("WGS 84 to EGM96 height (1)"),
                "egm96_15.gtx",
                wellknown::epsg_4979(),
            )
            .unwrap()]
        } else {
            Vec::new()
        };
        Crs::vertical_with_geoids(
            ObjectMeta::named("EGM96 height").with_epsg(5773),
            wellknown::datum_egm96(),
            CoordinateSystem::gravity_related_height(UnitOfMeasure::METRE),
            models,
        )
        .unwrap()
    }

    fn compound(horizontal: Arc<Crs>, vertical_crs: Arc<Crs>) -> Arc<Crs> {
        compound_of(&horizontal, &vertical_crs).unwrap()
    }

    fn run(source: &Arc<Crs>, target: &Arc<Crs>) -> Operations {
        CoordinateOperationFactory::new().create_operations(source, target, &OperationContext::new())
    }

    #[test]
    fn test_geoid_to_geographic_3d() {
        let source = compound(wellknown::epsg_4326(), egm96(true));
        let ops = run(&source, &wellknown::epsg_4979());
        assert_eq!(ops.len(), 1);
        assert!(!ops[0].has_ballpark_transformation());
        assert_eq!(
            ops[0].to_pipeline_string().unwrap(),
            "+proj=pipeline +step +proj=axisswap +order=2,1 \
             +step +proj=unitconvert +xy_in=deg +xy_out=rad \
             +step +proj=vgridshift +grids=egm96_15.gtx +multiplier=1 \
             +step +proj=unitconvert +xy_in=rad +xy_out=deg +step +proj=axisswap +order=2,1"
        );
        assert!(Arc::ptr_eq(&ops[0].source_crs().unwrap(), &source));
    }

    #[test]
    fn test_geographic_3d_to_compound_is_inverse() {
        let target = compound(wellknown::epsg_4326(), egm96(true));
        let ops = run(&wellknown::epsg_4979(), &target);
        assert_eq!(ops.len(), 1);
        assert!(ops[0]
            .to_pipeline_string()
            .unwrap()
            .contains("+inv +proj=vgridshift +grids=egm96_15.gtx +multiplier=1"));
    }

    #[test]
    fn test_ballpark_vertical_fallback() {
        let source = compound(wellknown::epsg_4326(), egm96(false));
        let ops = run(&source, &wellknown::epsg_4979());
        assert_eq!(ops.len(), 1);
        assert!(ops[0].has_ballpark_transformation());
        assert_eq!(
            ops[0].name(),
            "Ballpark vertical transformation from WGS 84 + EGM96 height to WGS 84"
        );
    }

    #[test]
    fn test_horizontal_only() {
        let source = compound(wellknown::epsg_4326(), egm96(false));
        let ops = run(&source, &wellknown::ogc_crs84());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "axis order change (2D)");
        assert_eq!(ops[0].source_crs().unwrap().name(), "WGS 84 + EGM96 height");
    }

    #[test]
    fn test_to_vertical_component() {
        let source = compound(wellknown::epsg_4326(), egm96(false));
        let ops = run(&source, &wellknown::egm96_depth());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].to_pipeline_string().unwrap(), "+proj=axisswap +order=1,2,-3");
    }

    #[test]
    fn test_compound_to_compound() {
        let source = compound(wellknown::epsg_4807(), wellknown::egm96_height());
        let target = compound(wellknown::epsg_4326(), wellknown::egm96_depth());
        let ops = run(&source, &target);
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.steps().len(), 2);
        assert_eq!(op.steps()[0].name(), "Height Depth Reversal");
        assert_eq!(
            op.steps()[0].target_crs().unwrap().name(),
            "NTF (Paris) + EGM96 depth"
        );
        assert!(op.has_ballpark_transformation());
        assert!(Arc::ptr_eq(&op.target_crs().unwrap(), &target));
    }

    #[test]
    fn test_compound_to_geocentric() {
        let source = compound(wellknown::epsg_4326(), egm96(true));
        let ops = run(&source, &wellknown::epsg_4978());
        assert_eq!(ops.len(), 1);
        let pipeline = ops[0].to_pipeline_string().unwrap();
        assert!(pipeline.contains("+proj=vgridshift +grids=egm96_15.gtx"));
        assert!(pipeline.ends_with("+step +proj=cart +ellps=WGS84"));
    }
}
