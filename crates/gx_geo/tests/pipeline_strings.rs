//! 管线字符串端到端测试
//!
//! 通过 `CoordinateOperationFactory` 求最优操作并导出管线字符串，
//! 覆盖轴序、地心、本初子午线、投影等常见组合。

use std::sync::Arc;

use gx_geo::crs::wellknown;
use gx_geo::prelude::*;

fn best(source: &Arc<Crs>, target: &Arc<Crs>) -> Arc<CoordinateOperation> {
    CoordinateOperationFactory::new()
        .create_operation(source, target, &OperationContext::new())
        .unwrap()
}

fn pipeline(source: &Arc<Crs>, target: &Arc<Crs>) -> String {
    best(source, target).to_pipeline_string().unwrap()
}

fn utm31() -> Arc<Crs> {
    Crs::projected(
        ObjectMeta::named("WGS 84 / UTM zone 31N").with_epsg(32631),
        wellknown::epsg_4326(),
        CoordinateOperation::create_utm(31, true).unwrap(),
        CoordinateSystem::easting_northing(UnitOfMeasure::METRE),
    )
    .unwrap()
}

#[test]
fn test_identity() {
    assert_eq!(pipeline(&wellknown::epsg_4326(), &wellknown::epsg_4326()), "+proj=noop");
    assert_eq!(pipeline(&wellknown::epsg_4978(), &wellknown::epsg_4978()), "+proj=noop");
}

#[test]
fn test_axis_swap_both_ways() {
    assert_eq!(
        pipeline(&wellknown::epsg_4326(), &wellknown::ogc_crs84()),
        "+proj=axisswap +order=2,1"
    );
    assert_eq!(
        pipeline(&wellknown::ogc_crs84(), &wellknown::epsg_4326()),
        "+proj=axisswap +order=2,1"
    );
}

#[test]
fn test_geocentric() {
    assert_eq!(
        pipeline(&wellknown::epsg_4978(), &wellknown::epsg_4326()),
        "+proj=pipeline +step +inv +proj=cart +ellps=WGS84 \
         +step +proj=unitconvert +xy_in=rad +xy_out=deg +step +proj=axisswap +order=2,1"
    );
}

#[test]
fn test_prime_meridian_and_datum() {
    let op = best(&wellknown::epsg_4807(), &wellknown::epsg_4326());
    assert!(op.has_ballpark_transformation());
    assert_eq!(
        op.to_pipeline_string().unwrap(),
        "+proj=pipeline +step +proj=axisswap +order=2,1 \
         +step +proj=unitconvert +xy_in=grad +xy_out=rad \
         +step +inv +proj=longlat +ellps=clrk80ign +pm=paris \
         +step +proj=unitconvert +xy_in=rad +xy_out=deg +step +proj=axisswap +order=2,1"
    );
}

#[test]
fn test_projection_chain() {
    assert_eq!(
        pipeline(&wellknown::ogc_crs84(), &utm31()),
        "+proj=pipeline +step +proj=unitconvert +xy_in=deg +xy_out=rad \
         +step +proj=utm +zone=31 +ellps=WGS84"
    );
    let from_paris = pipeline(&wellknown::epsg_4807(), &utm31());
    assert!(from_paris.starts_with("+proj=pipeline +step +proj=axisswap +order=2,1"));
    assert!(from_paris.ends_with("+step +proj=utm +zone=31 +ellps=WGS84"));
}

#[test]
fn test_inverse_round_trip() {
    // 取逆两次回到原操作
    for (source, target) in [
        (wellknown::epsg_4807(), wellknown::epsg_4326()),
        (wellknown::epsg_4978(), wellknown::epsg_4326()),
        (wellknown::ogc_crs84(), utm31()),
    ] {
        let op = best(&source, &target);
        let twice = op.inverse().inverse();
        assert!(twice.is_equivalent_to(&op, Criterion::Equivalent));
        assert!(op
            .source_crs()
            .unwrap()
            .is_equivalent_to(&source, Criterion::Equivalent));
        assert!(op
            .target_crs()
            .unwrap()
            .is_equivalent_to(&target, Criterion::Equivalent));
    }
}

#[test]
fn test_proj4_convention() {
    let op = best(&wellknown::ogc_crs84(), &utm31());
    assert!(op.to_pipeline_string_with(Convention::Proj4).is_ok());
    let ballpark = best(&wellknown::epsg_4807(), &wellknown::epsg_4326());
    let err = ballpark
        .to_pipeline_string_with(Convention::Proj4)
        .unwrap_err();
    assert!(err.is_formatting());
}

#[test]
fn test_inverse_matches_reverse_search() {
    // 非粗略操作：正向结果取逆与反向搜索结果一致
    let pairs = [
        (wellknown::epsg_4978(), wellknown::epsg_4326()),
        (wellknown::ogc_crs84(), utm31()),
    ];
    for (a, b) in &pairs {
        let forward = best(a, b);
        let backward = best(b, a);
        assert!(!forward.has_ballpark_transformation());
        assert_eq!(
            forward.inverse().to_pipeline_string().unwrap(),
            backward.to_pipeline_string().unwrap()
        );
        assert_eq!(backward.source_crs().unwrap().name(), b.name());
        assert_eq!(backward.target_crs().unwrap().name(), a.name());
    }
}
