// geodex\crates\gx_geo\src\factory\geodetic.rs
//! 大地族 CRS 之间的操作
//!
//! 同一基准：纯转换（轴序、单位、维度、地理与地心）。
//! 不同基准：注册表直接操作与枢纽操作；都没有时退化为经度旋转或粗略操作。

use super::{concatenate, lookup, Operations};
use crate::context::OperationContext;
use crate::crs::Crs;
use crate::cs::CoordinateSystem;
use crate::equivalence::{Criterion, Equivalence};
use crate::metadata::ObjectMeta;
use crate::operation::CoordinateOperation;
use crate::units::Measure;
use std::sync::Arc;

pub(super) fn search(source: &Arc<Crs>, target: &Arc<Crs>, ctx: &OperationContext) -> Operations {
    if let Some(rotation) = prime_meridian_only(source, target) {
        log::trace!("'{}' 与 '{}' 只差本初子午线", source.name(), target.name());
        return vec![rotation];
    }

    let mut results = lookup::direct_and_pivot(source, target, ctx);
    if same_datum(source, target) {
        if let Some(op) = conversion_between(source, target) {
            results.push(op);
        }
        return results;
    }
    if results.is_empty() {
        log::debug!(
            "'{}' 与 '{}' 之间没有已知变换，使用粗略操作",
            source.name(),
            target.name()
        );
        results.extend(ballpark(source, target));
    }
    results
}

pub(super) fn same_datum(source: &Crs, target: &Crs) -> bool {
    match (source.datum_source(), target.datum_source()) {
        (Some(a), Some(b)) => a.is_equivalent_to(b, Criterion::Equivalent),
        _ => false,
    }
}

// ============================================================================
// 同一基准内的转换
// ============================================================================

/// 前两轴交换后方向一致，第三轴（若有）完全一致
fn differs_by_axis_order(source: &CoordinateSystem, target: &CoordinateSystem) -> bool {
    let (s, t) = (source.axes(), target.axes());
    s.len() == t.len()
        && s.len() >= 2
        && s[0].direction == t[1].direction
        && s[1].direction == t[0].direction
        && s[2..]
            .iter()
            .zip(&t[2..])
            .all(|(a, b)| a.direction == b.direction && a.unit.is_equivalent(&b.unit))
}

/// 同一基准内两个大地族 CRS 之间的纯转换
///
/// 调用方保证两端基准相同；等价的两端返回 `None`。
pub(super) fn conversion_between(
    source: &Arc<Crs>,
    target: &Arc<Crs>,
) -> Option<Arc<CoordinateOperation>> {
    if source.is_equivalent_to(target, Criterion::Equivalent) {
        return None;
    }
    if !(source.is_geodetic_family() && target.is_geodetic_family()) {
        return None;
    }
    let (src_cs, tgt_cs) = (source.coordinate_system()?, target.coordinate_system()?);
    let op = if source.is_geographic() && target.is_geographic() {
        if src_cs.dimension() != tgt_cs.dimension() {
            CoordinateOperation::create_geographic_3d_to_2d(source.clone(), target.clone())
        } else if differs_by_axis_order(src_cs, tgt_cs) {
            CoordinateOperation::create_axis_order_reversal(src_cs.dimension() == 3)
                .with_endpoints(source.clone(), target.clone())
        } else {
            CoordinateOperation::create_geodetic_crs_change(source.clone(), target.clone())
        }
    } else if source.is_geocentric() != target.is_geocentric()
        && (source.is_geographic() || target.is_geographic())
    {
        CoordinateOperation::create_geographic_geocentric(source.clone(), target.clone())
    } else {
        CoordinateOperation::create_geodetic_crs_change(source.clone(), target.clone())
    };
    log::trace!("纯转换 '{}'", op.name());
    Some(op)
}

// ============================================================================
// 本初子午线
// ============================================================================

fn rotation(source: &Arc<Crs>, target: &Arc<Crs>) -> Option<Arc<CoordinateOperation>> {
    let (src_pm, tgt_pm) = (source.prime_meridian()?, target.prime_meridian()?);
    let offset = src_pm.longitude_deg() - tgt_pm.longitude_deg();
    Some(CoordinateOperation::create_longitude_rotation(
        ObjectMeta::named(format!(
            "Transformation from {} to {}",
            source.name(),
            target.name()
        )),
        source.clone(),
        target.clone(),
        Measure::degrees(offset),
    ))
}

/// 基准只差本初子午线的两个地理 CRS：直接经度旋转
fn prime_meridian_only(source: &Arc<Crs>, target: &Arc<Crs>) -> Option<Arc<CoordinateOperation>> {
    if !(source.is_geographic() && target.is_geographic()) {
        return None;
    }
    let (src_datum, tgt_datum) = (source.datum()?, target.datum()?);
    if !src_datum.differs_only_by_prime_meridian(&tgt_datum) {
        return None;
    }
    rotation(source, target)
}

/// 源 CRS 改用目标本初子午线后的中间 CRS
fn altered_to_target_meridian(source: &Arc<Crs>, target: &Arc<Crs>) -> Option<Arc<Crs>> {
    let (src_datum, tgt_datum) = (source.datum()?, target.datum()?);
    let pm = target.prime_meridian()?;
    let datum = src_datum.with_prime_meridian(
        ObjectMeta::named(format!(
            "{} altered to use prime meridian of {}",
            src_datum.name(),
            tgt_datum.name()
        )),
        pm,
    );
    let meta = ObjectMeta::named(format!(
        "{} altered to use prime meridian of {}",
        source.name(),
        target.name()
    ));
    match Crs::geographic(meta, Arc::new(datum), source.coordinate_system()?.clone()) {
        Ok(crs) => Some(crs),
        Err(err) => {
            log::warn!("无法构造 '{}' 的中间 CRS: {err}", source.name());
            None
        }
    }
}

// ============================================================================
// 粗略操作
// ============================================================================

fn ballpark(source: &Arc<Crs>, target: &Arc<Crs>) -> Operations {
    if source.is_geocentric() || target.is_geocentric() {
        return vec![CoordinateOperation::create_ballpark_geocentric_translation(
            source.clone(),
            target.clone(),
        )];
    }
    let meridians_differ = match (source.prime_meridian(), target.prime_meridian()) {
        (Some(a), Some(b)) => !a.is_equivalent_to(&b, Criterion::Equivalent),
        _ => false,
    };
    if meridians_differ && source.is_geographic() && target.is_geographic() {
        let shifted = altered_to_target_meridian(source, target).and_then(|interm| {
            let rotate = rotation(source, &interm)?;
            let offset =
                CoordinateOperation::create_ballpark_geographic_offset(interm, target.clone());
            concatenate(vec![rotate, offset])
        });
        if let Some(op) = shifted {
            return vec![op];
        }
    }
    vec![CoordinateOperation::create_ballpark_geographic_offset(
        source.clone(),
        target.clone(),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;
    use crate::datum::Datum;
    use crate::units::UnitOfMeasure;

    fn ctx() -> OperationContext {
        OperationContext::new()
    }

    fn pipeline(op: &CoordinateOperation) -> String {
        op.to_pipeline_string().unwrap()
    }

    #[test]
    fn test_axis_order_conversion() {
        let ops = search(&wellknown::epsg_4326(), &wellknown::ogc_crs84(), &ctx());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "axis order change (2D)");
        assert_eq!(pipeline(&ops[0]), "+proj=axisswap +order=2,1");
        assert!(!ops[0].has_ballpark_transformation());
    }

    #[test]
    fn test_geocentric_to_geographic() {
        let ops = search(&wellknown::epsg_4978(), &wellknown::epsg_4326(), &ctx());
        assert_eq!(ops.len(), 1);
        assert_eq!(
            pipeline(&ops[0]),
            "+proj=pipeline +step +inv +proj=cart +ellps=WGS84 \
             +step +proj=unitconvert +xy_in=rad +xy_out=deg +step +proj=axisswap +order=2,1"
        );
    }

    #[test]
    fn test_geographic_3d_to_2d() {
        let ops = search(&wellknown::epsg_4979(), &wellknown::epsg_4326(), &ctx());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Conversion from WGS 84 (geog3D) to WGS 84 (geog2D)");
        assert_eq!(ops[0].accuracy(), Some(0.0));
    }

    #[test]
    fn test_prime_meridian_with_datum_change() {
        let ops = search(&wellknown::epsg_4807(), &wellknown::epsg_4326(), &ctx());
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert!(op.has_ballpark_transformation());
        assert_eq!(op.steps().len(), 2);
        assert_eq!(
            op.steps()[0].name(),
            "Transformation from NTF (Paris) to NTF (Paris) altered to use prime meridian of WGS 84"
        );
        let offset = op.steps()[0]
            .parameter_in(crate::operation::epsg::LONGITUDE_OFFSET, &UnitOfMeasure::DEGREE)
            .unwrap();
        assert!((offset - 2.337_229_17).abs() < 1e-8);
        assert_eq!(
            pipeline(op),
            "+proj=pipeline +step +proj=axisswap +order=2,1 \
             +step +proj=unitconvert +xy_in=grad +xy_out=rad \
             +step +inv +proj=longlat +ellps=clrk80ign +pm=paris \
             +step +proj=unitconvert +xy_in=rad +xy_out=deg +step +proj=axisswap +order=2,1"
        );
    }

    #[test]
    fn test_prime_meridian_only() {
        let greenwich = wellknown::datum_ntf_paris().with_prime_meridian(
            wellknown::datum_ntf_paris().meta.clone(),
            crate::datum::PrimeMeridian::GREENWICH,
        );
        let ntf = Crs::geographic(
            ObjectMeta::named("NTF"),
            Arc::new(greenwich),
            CoordinateSystem::ellipsoidal_lat_long(UnitOfMeasure::DEGREE),
        )
        .unwrap();
        let ops = search(&wellknown::epsg_4807(), &ntf, &ctx());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Transformation from NTF (Paris) to NTF");
        assert_eq!(ops[0].accuracy(), Some(0.0));
        assert!(!ops[0].has_ballpark_transformation());
    }

    #[test]
    fn test_ballpark_geocentric() {
        let nad83 = Crs::geodetic(
            ObjectMeta::named("NAD83 geocentric"),
            wellknown::datum_nad83(),
            CoordinateSystem::geocentric(UnitOfMeasure::METRE),
        )
        .unwrap();
        let ops = search(&nad83, &wellknown::epsg_4978(), &ctx());
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0].name(),
            "Ballpark geocentric translation from NAD83 geocentric to WGS 84"
        );
        assert!(ops[0].has_ballpark_transformation());
    }

    #[test]
    fn test_same_datum() {
        assert!(same_datum(&wellknown::epsg_4326(), &wellknown::epsg_4978()));
        assert!(!same_datum(&wellknown::epsg_4326(), &wellknown::epsg_4807()));
        let other = Datum::geodetic(
            ObjectMeta::named("Other"),
            crate::datum::Ellipsoid::GRS80,
            crate::datum::PrimeMeridian::GREENWICH,
        );
        assert!(!other.is_equivalent_to(&wellknown::datum_wgs84(), Criterion::Equivalent));
    }
}
